//! crates/seminar_core/src/registry.rs
//!
//! Class lifecycle for a signed-in lecturer: creation with roster partitioning,
//! listing, best-effort deletion, roster views, assignment resets and export.

use std::sync::Arc;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use crate::domain::{
    AssignmentMode, Class, CsvExport, DeletionReport, NewClass, RosterEntry, SessionUser, Student,
    StudentFilter, StudentListing,
};
use crate::error::{ServiceError, ServiceResult};
use crate::export;
use crate::keys;
use crate::ports::{find_json, set_json, KeyValueStore, PortResult};
use crate::students::StudentRegistry;

#[derive(Clone)]
pub struct ClassRegistry {
    store: Arc<dyn KeyValueStore>,
    students: StudentRegistry,
}

impl ClassRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let students = StudentRegistry::new(store.clone());
        Self { store, students }
    }

    pub fn students(&self) -> &StudentRegistry {
        &self.students
    }

    pub async fn create_class(&self, owner: &SessionUser, new: NewClass) -> ServiceResult<Class> {
        let roster: Vec<RosterEntry> = new
            .students
            .iter()
            .filter(|s| !s.usn.trim().is_empty() && !s.name.trim().is_empty())
            .map(|s| RosterEntry {
                usn: keys::normalize_usn(&s.usn),
                name: s.name.trim().to_string(),
            })
            .collect();
        let topics: Vec<String> = new
            .topics
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if roster.is_empty() {
            return Err(ServiceError::Validation(
                "Please add at least one student".to_string(),
            ));
        }
        if topics.is_empty() {
            return Err(ServiceError::Validation(
                "Please add at least one topic".to_string(),
            ));
        }
        let group_size = match new.assignment_mode {
            AssignmentMode::Individual => 1,
            AssignmentMode::Group if new.group_size >= 2 => new.group_size,
            AssignmentMode::Group => {
                return Err(ServiceError::Validation(
                    "Group size must be at least 2".to_string(),
                ))
            }
        };

        let now = Utc::now();
        let class = Class {
            id: generate_class_id(),
            lecturer_email: owner.email.clone(),
            subject: new.subject.trim().to_string(),
            section: new.section.trim().to_string(),
            assignment_mode: new.assignment_mode,
            group_size,
            topics,
            student_count: roster.len(),
            created_at: now,
        };
        set_json(self.store.as_ref(), &keys::class(&class.id), &class).await?;

        let mut usns = Vec::with_capacity(roster.len());
        for chunk in roster.chunks(group_size) {
            for entry in chunk {
                let group_members = match class.assignment_mode {
                    AssignmentMode::Group => chunk
                        .iter()
                        .map(|m| m.usn.clone())
                        .filter(|u| *u != entry.usn)
                        .collect(),
                    AssignmentMode::Individual => Vec::new(),
                };
                let student = Student {
                    class_id: class.id.clone(),
                    usn: entry.usn.clone(),
                    name: entry.name.clone(),
                    section: class.section.clone(),
                    group_members,
                    assigned_topic: None,
                    assigned_by: None,
                    created_at: now,
                };
                self.students.save(&student).await?;
                usns.push(entry.usn.clone());
            }
        }
        self.students.save_class_index(&class.id, &usns).await?;

        let mut class_ids = self.lecturer_index(&owner.email).await?;
        class_ids.push(class.id.clone());
        set_json(
            self.store.as_ref(),
            &keys::lecturer_classes(&owner.email),
            &class_ids,
        )
        .await?;

        info!(
            "Created class {} ({} students, {} topics)",
            class.id,
            class.student_count,
            class.topics.len()
        );
        Ok(class)
    }

    /// Classes in the order they were created. Unreadable entries are skipped.
    pub async fn list_classes(&self, owner: &SessionUser) -> ServiceResult<Vec<Class>> {
        let mut classes = Vec::new();
        for class_id in self.lecturer_index(&owner.email).await? {
            match find_json::<Class>(self.store.as_ref(), &keys::class(&class_id)).await {
                Ok(Some(class)) => classes.push(class),
                Ok(None) => warn!("Class {} is indexed but missing", class_id),
                Err(e) => warn!("Error loading class {}: {}", class_id, e),
            }
        }
        Ok(classes)
    }

    pub async fn get_class(&self, owner: &SessionUser, class_id: &str) -> ServiceResult<Class> {
        let class: Class = find_json(self.store.as_ref(), &keys::class(class_id))
            .await?
            .ok_or_else(|| ServiceError::NotFound("Class not found".to_string()))?;
        if class.lecturer_email != owner.email {
            return Err(ServiceError::Unauthorized(
                "This class belongs to another lecturer".to_string(),
            ));
        }
        Ok(class)
    }

    /// Removes a class and everything hanging off it. Each step runs even if an
    /// earlier one failed; failures are logged and listed in the report.
    pub async fn delete_class(
        &self,
        owner: &SessionUser,
        class_id: &str,
    ) -> ServiceResult<DeletionReport> {
        let mut report = DeletionReport {
            class_id: class_id.to_string(),
            ..Default::default()
        };

        match find_json::<Class>(self.store.as_ref(), &keys::class(class_id)).await {
            Ok(Some(class)) if class.lecturer_email != owner.email => {
                return Err(ServiceError::Unauthorized(
                    "This class belongs to another lecturer".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => warn!("Could not verify owner of class {}: {}", class_id, e),
        }

        if let Err(e) = self.store.delete(&keys::class(class_id)).await {
            warn!("Error deleting class record {}: {}", class_id, e);
            report.failed_steps.push("class record".to_string());
        }

        match self.students.class_index(class_id).await {
            Ok(usns) => {
                for usn in usns {
                    match self.delete_student_of(class_id, &usn).await {
                        Ok(true) => report.students_removed += 1,
                        Ok(false) => {}
                        Err(e) => {
                            warn!("Error deleting student {}: {}", usn, e);
                            report.failed_steps.push(format!("student {}", usn));
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Error loading students of class {}: {}", class_id, e);
                report.failed_steps.push("student records".to_string());
            }
        }

        if let Err(e) = self.students.delete_class_index(class_id).await {
            warn!("Error deleting student index of {}: {}", class_id, e);
            report.failed_steps.push("student index".to_string());
        }

        if let Err(e) = self.remove_from_lecturer_index(&owner.email, class_id).await {
            warn!("Error updating class list of {}: {}", owner.email, e);
            report.failed_steps.push("lecturer class list".to_string());
        }

        info!(
            "Deleted class {} ({} students removed, {} failed steps)",
            class_id,
            report.students_removed,
            report.failed_steps.len()
        );
        Ok(report)
    }

    pub async fn list_students(
        &self,
        owner: &SessionUser,
        class_id: &str,
        filter: StudentFilter,
    ) -> ServiceResult<StudentListing> {
        self.get_class(owner, class_id).await?;
        let all = self.students.load_class(class_id).await?;
        let assigned = all.iter().filter(|s| s.is_assigned()).count();
        let unassigned = all.len() - assigned;
        let students = all.into_iter().filter(|s| filter.matches(s)).collect();
        Ok(StudentListing {
            students,
            assigned,
            unassigned,
        })
    }

    /// Clears the topic of a student and of every group member.
    pub async fn reset_assignment(&self, owner: &SessionUser, usn: &str) -> ServiceResult<Student> {
        let usn = keys::normalize_usn(usn);
        let mut student = self
            .students
            .find(&usn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("USN not found".to_string()))?;
        self.get_class(owner, &student.class_id).await?;

        student.assigned_topic = None;
        student.assigned_by = None;
        self.students.save(&student).await?;

        for member_usn in &student.group_members {
            match self.students.find(member_usn).await {
                Ok(Some(mut member)) => {
                    member.assigned_topic = None;
                    member.assigned_by = None;
                    if let Err(e) = self.students.save(&member).await {
                        warn!("Error resetting group member {}: {}", member_usn, e);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Error resetting group member {}: {}", member_usn, e),
            }
        }
        info!("Reset assignment of {}", usn);
        Ok(student)
    }

    pub async fn export_csv(
        &self,
        owner: &SessionUser,
        class_id: &str,
    ) -> ServiceResult<CsvExport> {
        let class = self.get_class(owner, class_id).await?;
        let students = self.students.load_class(class_id).await?;
        Ok(export::assignments_csv(&class, &students))
    }

    async fn lecturer_index(&self, email: &str) -> PortResult<Vec<String>> {
        Ok(find_json(self.store.as_ref(), &keys::lecturer_classes(email))
            .await?
            .unwrap_or_default())
    }

    async fn remove_from_lecturer_index(&self, email: &str, class_id: &str) -> PortResult<()> {
        let remaining: Vec<String> = self
            .lecturer_index(email)
            .await?
            .into_iter()
            .filter(|id| id != class_id)
            .collect();
        set_json(self.store.as_ref(), &keys::lecturer_classes(email), &remaining).await
    }

    /// Returns whether a record was removed. Students re-registered under
    /// another class are left alone.
    async fn delete_student_of(&self, class_id: &str, usn: &str) -> PortResult<bool> {
        match self.students.find(usn).await? {
            Some(student) if student.class_id == class_id => {
                self.students.delete(usn).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// `class_<unix millis>_<9 base-36 chars>`. Unique with high probability only.
fn generate_class_id() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(|c| (c as char).to_ascii_lowercase())
        .take(9)
        .collect();
    format!("class_{}_{}", Utc::now().timestamp_millis(), token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailingStore, MemoryStore};

    fn owner() -> SessionUser {
        SessionUser {
            email: "ada@uni.edu".to_string(),
            name: "Ada".to_string(),
        }
    }

    fn entry(usn: &str, name: &str) -> RosterEntry {
        RosterEntry {
            usn: usn.to_string(),
            name: name.to_string(),
        }
    }

    fn group_class(students: Vec<RosterEntry>, group_size: usize) -> NewClass {
        NewClass {
            subject: "Networks".to_string(),
            section: "A".to_string(),
            assignment_mode: AssignmentMode::Group,
            group_size,
            students,
            topics: vec!["TCP".to_string(), " ".to_string(), "QUIC".to_string()],
        }
    }

    fn registry() -> (ClassRegistry, MemoryStore) {
        let store = MemoryStore::new();
        (ClassRegistry::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_create_class_partitions_roster_into_groups() {
        let (reg, _) = registry();
        let roster = vec![
            entry("1cr01", "Asha"),
            entry("1cr02", "Ben"),
            entry("1cr03", "Chen"),
            entry("", "Ghost"),
            entry("1cr04", "Dev"),
            entry("1cr05", "Esi"),
        ];
        let class = reg.create_class(&owner(), group_class(roster, 2)).await.unwrap();

        assert!(class.id.starts_with("class_"));
        assert_eq!(class.student_count, 5);
        assert_eq!(class.topics, vec!["TCP", "QUIC"]);

        let students = reg.students().load_class(&class.id).await.unwrap();
        let members: Vec<_> = students.iter().map(|s| s.group_members.clone()).collect();
        assert_eq!(
            members,
            vec![
                vec!["1CR02".to_string()],
                vec!["1CR01".to_string()],
                vec!["1CR04".to_string()],
                vec!["1CR03".to_string()],
                Vec::<String>::new(),
            ]
        );
        assert!(students.iter().all(|s| s.section == "A" && !s.is_assigned()));

        let listed = reg.list_classes(&owner()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, class.id);
    }

    #[tokio::test]
    async fn test_individual_mode_has_no_groups() {
        let (reg, _) = registry();
        let mut new = group_class(vec![entry("a", "A"), entry("b", "B")], 7);
        new.assignment_mode = AssignmentMode::Individual;
        let class = reg.create_class(&owner(), new).await.unwrap();

        assert_eq!(class.group_size, 1);
        let students = reg.students().load_class(&class.id).await.unwrap();
        assert!(students.iter().all(|s| s.group_members.is_empty()));
    }

    #[tokio::test]
    async fn test_create_class_validation() {
        let (reg, _) = registry();

        let no_students = group_class(vec![entry(" ", "Nobody")], 2);
        let err = reg.create_class(&owner(), no_students).await.unwrap_err();
        assert_eq!(err.to_string(), "Please add at least one student");

        let mut no_topics = group_class(vec![entry("a", "A")], 2);
        no_topics.topics = vec!["".to_string()];
        let err = reg.create_class(&owner(), no_topics).await.unwrap_err();
        assert_eq!(err.to_string(), "Please add at least one topic");

        let tiny_groups = group_class(vec![entry("a", "A")], 1);
        assert!(matches!(
            reg.create_class(&owner(), tiny_groups).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_class_removes_every_affected_key() {
        let (reg, store) = registry();
        let keep = reg
            .create_class(&owner(), group_class(vec![entry("k1", "Kim")], 2))
            .await
            .unwrap();
        let class = reg
            .create_class(
                &owner(),
                group_class(vec![entry("s1", "Sam"), entry("s2", "Sia")], 2),
            )
            .await
            .unwrap();

        let report = reg.delete_class(&owner(), &class.id).await.unwrap();
        assert_eq!(report.students_removed, 2);
        assert!(report.failed_steps.is_empty());

        for key in [
            keys::class(&class.id),
            keys::class_students(&class.id),
            keys::student("S1"),
            keys::student("S2"),
        ] {
            assert!(store.get(&key).await.is_err(), "{} should be gone", key);
        }
        let remaining = reg.list_classes(&owner()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_delete_class_continues_past_failed_steps() {
        let store = FailingStore::new();
        let reg = ClassRegistry::new(Arc::new(store.clone()));
        let class = reg
            .create_class(
                &owner(),
                group_class(vec![entry("s1", "Sam"), entry("s2", "Sia")], 2),
            )
            .await
            .unwrap();
        store.fail_deletes("class:");
        store.fail_deletes("student:S1");

        let report = reg.delete_class(&owner(), &class.id).await.unwrap();
        assert_eq!(report.class_id, class.id);
        assert_eq!(report.students_removed, 1);
        assert_eq!(report.failed_steps, vec!["class record", "student S1"]);

        assert!(store.get(&keys::class(&class.id)).await.is_ok());
        assert!(store.get("student:S1").await.is_ok());
        assert!(store.get("student:S2").await.is_err());
        assert!(store.get(&keys::class_students(&class.id)).await.is_err());
        let index: Vec<String> = find_json(&store, &keys::lecturer_classes("ada@uni.edu"))
            .await
            .unwrap()
            .unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_delete_class_skips_students_moved_to_another_class() {
        let (reg, store) = registry();
        let first = reg
            .create_class(&owner(), group_class(vec![entry("dup", "Old")], 2))
            .await
            .unwrap();
        // Re-registering the USN in a second class overwrites the record.
        reg.create_class(&owner(), group_class(vec![entry("dup", "New")], 2))
            .await
            .unwrap();

        let report = reg.delete_class(&owner(), &first.id).await.unwrap();
        assert_eq!(report.students_removed, 0);
        assert!(store.get("student:DUP").await.is_ok());
    }

    #[tokio::test]
    async fn test_other_lecturers_cannot_touch_a_class() {
        let (reg, _) = registry();
        let class = reg
            .create_class(&owner(), group_class(vec![entry("a", "A")], 2))
            .await
            .unwrap();
        let intruder = SessionUser {
            email: "eve@uni.edu".to_string(),
            name: "Eve".to_string(),
        };

        assert!(matches!(
            reg.get_class(&intruder, &class.id).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            reg.delete_class(&intruder, &class.id).await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_reset_assignment_clears_whole_group_and_filters() {
        let (reg, _) = registry();
        let class = reg
            .create_class(
                &owner(),
                group_class(
                    vec![entry("g1", "Gia"), entry("g2", "Gus"), entry("g3", "Hal")],
                    2,
                ),
            )
            .await
            .unwrap();
        for usn in ["G1", "G2"] {
            let mut s = reg.students().find(usn).await.unwrap().unwrap();
            s.assigned_topic = Some("TCP".to_string());
            s.assigned_by = Some("Gia".to_string());
            reg.students().save(&s).await.unwrap();
        }

        let listing = reg
            .list_students(&owner(), &class.id, StudentFilter::Assigned)
            .await
            .unwrap();
        assert_eq!(listing.students.len(), 2);
        assert_eq!((listing.assigned, listing.unassigned), (2, 1));

        reg.reset_assignment(&owner(), " g1 ").await.unwrap();

        let listing = reg
            .list_students(&owner(), &class.id, StudentFilter::Unassigned)
            .await
            .unwrap();
        assert_eq!(listing.students.len(), 3);
        assert!(listing.students.iter().all(|s| s.assigned_by.is_none()));
    }
}
