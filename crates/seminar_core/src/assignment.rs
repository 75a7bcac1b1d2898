//! crates/seminar_core/src/assignment.rs
//!
//! Resolves a student's seminar topic: returns an existing assignment, adopts a
//! group-mate's, or draws a fresh unclaimed topic from the class list.
//!
//! Topic exclusivity is checked by rescanning the class on every draw. There is
//! no reservation across keys, so two concurrent draws can pick the same topic.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{AssignmentResult, Class, Student};
use crate::error::{ServiceError, ServiceResult};
use crate::keys;
use crate::ports::{find_json, KeyValueStore, RandomPicker, TopicPicker};
use crate::students::StudentRegistry;

#[derive(Clone)]
pub struct TopicAssigner {
    store: Arc<dyn KeyValueStore>,
    students: StudentRegistry,
    picker: Arc<dyn TopicPicker>,
}

impl TopicAssigner {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_picker(store, Arc::new(RandomPicker))
    }

    pub fn with_picker(store: Arc<dyn KeyValueStore>, picker: Arc<dyn TopicPicker>) -> Self {
        let students = StudentRegistry::new(store.clone());
        Self {
            store,
            students,
            picker,
        }
    }

    pub async fn resolve_topic(&self, usn: &str) -> ServiceResult<AssignmentResult> {
        let usn = keys::normalize_usn(usn);
        if usn.is_empty() {
            return Err(ServiceError::Validation("Please enter your USN".to_string()));
        }

        let mut student = self.students.find(&usn).await?.ok_or_else(|| {
            ServiceError::NotFound("USN not found. Please check and try again.".to_string())
        })?;
        let is_group = !student.group_members.is_empty();

        // 1. Already assigned.
        if let Some(topic) = student.assigned_topic.clone() {
            let assigned_by = student
                .assigned_by
                .clone()
                .unwrap_or_else(|| student.name.clone());
            return Ok(AssignmentResult {
                topic,
                assigned_by,
                is_group,
                members: self.students.group_roster(&student).await,
            });
        }

        // 2. A group-mate already drew. The requester's record is left as is.
        if let Some(mate) = self.assigned_group_mate(&student).await {
            let assigned_by = mate.assigned_by.clone().unwrap_or_else(|| mate.name.clone());
            return Ok(AssignmentResult {
                topic: mate.assigned_topic.unwrap_or_default(),
                assigned_by,
                is_group: true,
                members: self.students.group_roster(&student).await,
            });
        }

        // 3. Fresh draw among topics nobody in the class holds yet.
        let class: Class = find_json(self.store.as_ref(), &keys::class(&student.class_id))
            .await?
            .ok_or_else(|| ServiceError::NotFound("Class information not found.".to_string()))?;
        let claimed = self.claimed_topics(&student.class_id).await;
        let available: Vec<&String> = class
            .topics
            .iter()
            .filter(|t| !claimed.contains(t.as_str()))
            .collect();
        if available.is_empty() {
            return Err(ServiceError::Exhausted);
        }

        let topic = available[self.picker.pick(available.len())].clone();
        debug!(
            "Picked \"{}\" for {} out of {} available",
            topic,
            usn,
            available.len()
        );

        student.assigned_topic = Some(topic.clone());
        student.assigned_by = Some(student.name.clone());
        self.students.save(&student).await?;
        self.propagate_to_group(&student, &topic).await;
        info!("Assigned \"{}\" to {}", topic, usn);

        Ok(AssignmentResult {
            topic,
            assigned_by: student.name.clone(),
            is_group,
            members: self.students.group_roster(&student).await,
        })
    }

    /// First group member, in roster order, that already holds a topic.
    async fn assigned_group_mate(&self, student: &Student) -> Option<Student> {
        for usn in &student.group_members {
            match self.students.find(usn).await {
                Ok(Some(member)) if member.is_assigned() => return Some(member),
                Ok(_) => {}
                Err(e) => warn!("Group member not checked: {}: {}", usn, e),
            }
        }
        None
    }

    /// Topics held by any student of the class. Unreadable records are skipped.
    async fn claimed_topics(&self, class_id: &str) -> HashSet<String> {
        match self.students.load_class(class_id).await {
            Ok(students) => students
                .into_iter()
                .filter_map(|s| s.assigned_topic)
                .collect(),
            Err(e) => {
                warn!("Error loading students of class {}: {}", class_id, e);
                HashSet::new()
            }
        }
    }

    /// Copies the topic to every group member. Each write stands alone; a
    /// failure leaves the group partially assigned.
    async fn propagate_to_group(&self, student: &Student, topic: &str) {
        for usn in &student.group_members {
            let mut member = match self.students.find(usn).await {
                Ok(Some(member)) => member,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Error updating group member {}: {}", usn, e);
                    continue;
                }
            };
            member.assigned_topic = Some(topic.to_string());
            member.assigned_by = Some(student.name.clone());
            if let Err(e) = self.students.save(&member).await {
                warn!("Error updating group member {}: {}", usn, e);
            }
        }
    }
}
