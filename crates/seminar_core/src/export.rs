//! CSV rendering of a class's assignment sheet.

use crate::domain::{Class, CsvExport, Student};

const HEADER: [&str; 4] = ["USN", "Name", "Section", "Assigned Topic"];
const NOT_ASSIGNED: &str = "Not Assigned";

pub fn assignments_csv(class: &Class, students: &[Student]) -> CsvExport {
    let mut lines = vec![HEADER.join(",")];
    for s in students {
        let topic = s.assigned_topic.as_deref().unwrap_or(NOT_ASSIGNED);
        let row = [s.usn.as_str(), s.name.as_str(), s.section.as_str(), topic];
        lines.push(row.iter().map(|f| escape(f)).collect::<Vec<_>>().join(","));
    }
    CsvExport {
        file_name: format!("{}_{}_assignments.csv", class.subject, class.section),
        content: lines.join("\n"),
    }
}

fn escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssignmentMode;
    use chrono::Utc;

    fn student(usn: &str, name: &str, topic: Option<&str>) -> Student {
        Student {
            class_id: "c".to_string(),
            usn: usn.to_string(),
            name: name.to_string(),
            section: "B".to_string(),
            group_members: vec![],
            assigned_topic: topic.map(str::to_string),
            assigned_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_export_marks_unassigned_and_quotes_commas() {
        let class = Class {
            id: "c".to_string(),
            lecturer_email: "ada@uni.edu".to_string(),
            subject: "OS".to_string(),
            section: "B".to_string(),
            assignment_mode: AssignmentMode::Individual,
            group_size: 1,
            topics: vec![],
            student_count: 2,
            created_at: Utc::now(),
        };
        let export = assignments_csv(
            &class,
            &[
                student("1CR01", "Asha", Some("Paging, TLBs")),
                student("1CR02", "Ben", None),
            ],
        );

        assert_eq!(export.file_name, "OS_B_assignments.csv");
        assert_eq!(
            export.content,
            "USN,Name,Section,Assigned Topic\n1CR01,Asha,B,\"Paging, TLBs\"\n1CR02,Ben,B,Not Assigned"
        );
    }
}
