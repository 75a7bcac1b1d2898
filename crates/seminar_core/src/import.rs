//! Roster and topic import from uploaded tables.
//!
//! Accepts comma- or tab-separated text whose first line is a header row.
//! Header names are matched case-insensitively; extra columns are ignored.

use crate::domain::RosterEntry;
use crate::error::{ServiceError, ServiceResult};

pub fn parse_roster(text: &str) -> ServiceResult<Vec<RosterEntry>> {
    let table = Table::parse(text)?;
    let (usn_col, name_col) = match (table.column("usn"), table.column("name")) {
        (Some(u), Some(n)) => (u, n),
        _ => {
            return Err(ServiceError::Validation(
                "File must have columns named \"USN\" and \"Name\" for students".to_string(),
            ))
        }
    };

    let students: Vec<RosterEntry> = table
        .rows
        .iter()
        .map(|row| RosterEntry {
            usn: cell(row, usn_col).to_string(),
            name: cell(row, name_col).to_string(),
        })
        .filter(|s| !s.usn.is_empty() && !s.name.is_empty())
        .collect();

    if students.is_empty() {
        return Err(ServiceError::Validation(
            "No valid student data found in the file".to_string(),
        ));
    }
    Ok(students)
}

pub fn parse_topics(text: &str) -> ServiceResult<Vec<String>> {
    let table = Table::parse(text)?;
    let topic_col = table.column("topic").ok_or_else(|| {
        ServiceError::Validation("File must have a column named \"Topic\" for topics".to_string())
    })?;

    let topics: Vec<String> = table
        .rows
        .iter()
        .map(|row| cell(row, topic_col).to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if topics.is_empty() {
        return Err(ServiceError::Validation(
            "No valid topics found in the file".to_string(),
        ));
    }
    Ok(topics)
}

struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn parse(text: &str) -> ServiceResult<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let first = text
            .lines()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| ServiceError::Validation("The file is empty".to_string()))?;
        let delimiter = if first.contains('\t') { '\t' } else { ',' };

        let mut records = read_records(text, delimiter).into_iter();
        let header = records
            .next()
            .ok_or_else(|| ServiceError::Validation("The file is empty".to_string()))?
            .into_iter()
            .map(|h| h.to_lowercase())
            .collect();
        Ok(Self {
            header,
            rows: records.collect(),
        })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Splits text into records of trimmed fields. A double-quoted field may hold
/// the delimiter, line breaks and `""` escapes. Records with only empty
/// fields are dropped.
fn read_records(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            '\r' if chars.peek() == Some(&'\n') => {}
            c if c == delimiter && !quoted => record.push(take_field(&mut field)),
            '\n' if !quoted => {
                record.push(take_field(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            c => field.push(c),
        }
    }
    record.push(take_field(&mut field));
    push_record(&mut records, record);
    records
}

fn take_field(field: &mut String) -> String {
    let trimmed = field.trim().to_string();
    field.clear();
    trimmed
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    if record.iter().any(|f| !f.is_empty()) {
        records.push(record);
    }
}
