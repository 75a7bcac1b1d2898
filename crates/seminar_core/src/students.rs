//! crates/seminar_core/src/students.rs
//!
//! Accessors for student records and the per-class student index.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{GroupMember, Student};
use crate::keys;
use crate::ports::{find_json, set_json, KeyValueStore, PortResult};

#[derive(Clone)]
pub struct StudentRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl StudentRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Looks up a student by an already-normalized USN.
    pub async fn find(&self, usn: &str) -> PortResult<Option<Student>> {
        find_json(self.store.as_ref(), &keys::student(usn)).await
    }

    pub async fn save(&self, student: &Student) -> PortResult<()> {
        set_json(self.store.as_ref(), &keys::student(&student.usn), student).await
    }

    pub async fn delete(&self, usn: &str) -> PortResult<()> {
        self.store.delete(&keys::student(usn)).await?;
        Ok(())
    }

    /// The ordered USN index of a class. A missing index reads as empty.
    pub async fn class_index(&self, class_id: &str) -> PortResult<Vec<String>> {
        Ok(find_json(self.store.as_ref(), &keys::class_students(class_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn save_class_index(&self, class_id: &str, usns: &[String]) -> PortResult<()> {
        set_json(self.store.as_ref(), &keys::class_students(class_id), usns).await
    }

    pub async fn delete_class_index(&self, class_id: &str) -> PortResult<()> {
        self.store.delete(&keys::class_students(class_id)).await?;
        Ok(())
    }

    /// Loads every student listed in the class index, in index order.
    /// Records that are missing or unreadable are skipped.
    pub async fn load_class(&self, class_id: &str) -> PortResult<Vec<Student>> {
        let mut students = Vec::new();
        for usn in self.class_index(class_id).await? {
            match self.find(&usn).await {
                Ok(Some(student)) => students.push(student),
                Ok(None) => warn!("Student {} listed in class {} has no record", usn, class_id),
                Err(e) => warn!("Error loading student {}: {}", usn, e),
            }
        }
        Ok(students)
    }

    /// The student followed by each group member, falling back to the raw USN
    /// when a member's record cannot be read.
    pub async fn group_roster(&self, student: &Student) -> Vec<GroupMember> {
        let mut members = vec![GroupMember {
            usn: student.usn.clone(),
            name: student.name.clone(),
        }];
        for usn in &student.group_members {
            let name = match self.find(usn).await {
                Ok(Some(member)) => member.name,
                Ok(None) => usn.clone(),
                Err(e) => {
                    warn!("Error loading group member {}: {}", usn, e);
                    usn.clone()
                }
            };
            members.push(GroupMember {
                usn: usn.clone(),
                name,
            });
        }
        members
    }
}
