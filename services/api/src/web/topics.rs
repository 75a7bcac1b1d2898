//! services/api/src/web/topics.rs
//!
//! The student-facing lookup: resolve a USN to its seminar topic.

use axum::{extract::State, http::StatusCode, Json};
use seminar_core::AssignmentResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::rest::service_error;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct ResolveTopicRequest {
    pub usn: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    pub usn: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    pub topic: String,
    /// Name of the student whose lookup drew the topic.
    pub assigned_by: String,
    pub is_group: bool,
    pub members: Vec<MemberResponse>,
}

impl From<AssignmentResult> for AssignmentResponse {
    fn from(result: AssignmentResult) -> Self {
        Self {
            topic: result.topic,
            assigned_by: result.assigned_by,
            is_group: result.is_group,
            members: result
                .members
                .into_iter()
                .map(|m| MemberResponse {
                    usn: m.usn,
                    name: m.name,
                })
                .collect(),
        }
    }
}

/// Look up (or draw) the topic for a USN.
///
/// Returns an existing assignment unchanged; otherwise picks a random topic
/// not yet taken in the student's class and shares it with the whole group.
#[utoipa::path(
    post,
    path = "/topics/resolve",
    request_body = ResolveTopicRequest,
    responses(
        (status = 200, description = "Topic for the student", body = AssignmentResponse),
        (status = 400, description = "Blank USN"),
        (status = 404, description = "USN or class not found"),
        (status = 409, description = "All topics have been assigned"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn resolve_topic_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveTopicRequest>,
) -> Result<Json<AssignmentResponse>, (StatusCode, String)> {
    let result = state
        .assigner
        .resolve_topic(&req.usn)
        .await
        .map_err(service_error)?;
    Ok(Json(result.into()))
}
