//! crates/seminar_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! Records are stored in the key-value store as JSON, so the persisted
//! structs carry serde derives with camelCase field names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Lecturers and Sessions
//=========================================================================================

/// A lecturer account, stored under `lecturer:<email>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecturer {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub department: String,
    /// PHC-formatted password hash.
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Signup input, before normalization and hashing.
#[derive(Debug, Clone)]
pub struct NewLecturer {
    pub email: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub password: String,
}

// The identity carried through every lecturer operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
}

/// A login session, stored under `session:<token>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    #[serde(skip)]
    pub token: String,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Classes
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    Individual,
    Group,
}

/// A class record, stored under `class:<classId>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub lecturer_email: String,
    pub subject: String,
    pub section: String,
    pub assignment_mode: AssignmentMode,
    pub group_size: usize,
    pub topics: Vec<String>,
    pub student_count: usize,
    pub created_at: DateTime<Utc>,
}

/// One roster row as entered by the lecturer or parsed from an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub usn: String,
    pub name: String,
}

/// Class creation input.
#[derive(Debug, Clone)]
pub struct NewClass {
    pub subject: String,
    pub section: String,
    pub assignment_mode: AssignmentMode,
    pub group_size: usize,
    pub students: Vec<RosterEntry>,
    pub topics: Vec<String>,
}

//=========================================================================================
// Students
//=========================================================================================

/// A student record, stored under `student:<usn>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub class_id: String,
    pub usn: String,
    pub name: String,
    pub section: String,
    #[serde(default)]
    pub group_members: Vec<String>,
    #[serde(default)]
    pub assigned_topic: Option<String>,
    #[serde(default)]
    pub assigned_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn is_assigned(&self) -> bool {
        self.assigned_topic.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    pub usn: String,
    pub name: String,
}

/// What a student sees after looking up their USN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentResult {
    pub topic: String,
    pub assigned_by: String,
    pub is_group: bool,
    /// The requester first, then every group member in roster order.
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentFilter {
    All,
    Assigned,
    Unassigned,
}

impl FromStr for StudentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(StudentFilter::All),
            "assigned" => Ok(StudentFilter::Assigned),
            "unassigned" => Ok(StudentFilter::Unassigned),
            other => Err(format!(
                "Unknown filter '{}', expected all, assigned or unassigned",
                other
            )),
        }
    }
}

impl StudentFilter {
    pub fn matches(self, student: &Student) -> bool {
        match self {
            StudentFilter::All => true,
            StudentFilter::Assigned => student.is_assigned(),
            StudentFilter::Unassigned => !student.is_assigned(),
        }
    }
}

/// A class roster view. Counts always cover the whole class, not just the filtered rows.
#[derive(Debug, Clone)]
pub struct StudentListing {
    pub students: Vec<Student>,
    pub assigned: usize,
    pub unassigned: usize,
}

/// Outcome of a best-effort class deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub class_id: String,
    pub students_removed: usize,
    pub failed_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}
