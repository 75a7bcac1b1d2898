//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the mapping from
//! core service errors to HTTP responses.

use axum::http::StatusCode;
use seminar_core::ServiceError;
use tracing::{error, warn};
use utoipa::OpenApi;

use crate::web::{auth, classes, imports, topics};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        topics::resolve_topic_handler,
        imports::import_roster_handler,
        imports::import_topics_handler,
        classes::list_classes_handler,
        classes::create_class_handler,
        classes::get_class_handler,
        classes::delete_class_handler,
        classes::list_students_handler,
        classes::export_class_handler,
        classes::reset_assignment_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::ProfileResponse,
            topics::ResolveTopicRequest,
            topics::AssignmentResponse,
            topics::MemberResponse,
            imports::ImportedRoster,
            imports::ImportedTopics,
            classes::Mode,
            classes::RosterRow,
            classes::CreateClassRequest,
            classes::ClassResponse,
            classes::StudentResponse,
            classes::StudentListResponse,
            classes::DeletionResponse,
        )
    ),
    tags(
        (name = "Seminar Topic API", description = "Class rosters and random seminar topic assignment.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

const GENERIC_FAILURE: &str = "An error occurred. Please try again.";

/// Collapses a service error into a status code and a user-facing message.
/// Infrastructure failures are logged and replaced with a generic message.
pub fn service_error(err: ServiceError) -> (StatusCode, String) {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Exhausted | ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", err);
        (status, GENERIC_FAILURE.to_string())
    } else {
        warn!("Request rejected: {}", err);
        (status, err.to_string())
    }
}
