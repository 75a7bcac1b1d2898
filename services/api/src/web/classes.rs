//! services/api/src/web/classes.rs
//!
//! Lecturer endpoints for managing classes and their rosters. Every handler
//! runs behind `require_auth` and receives the signed-in lecturer explicitly.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use seminar_core::{
    AssignmentMode, Class, DeletionReport, NewClass, RosterEntry, SessionUser, Student,
    StudentFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::web::rest::service_error;
use crate::web::state::AppState;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Individual,
    Group,
}

impl From<Mode> for AssignmentMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Individual => AssignmentMode::Individual,
            Mode::Group => AssignmentMode::Group,
        }
    }
}

impl From<AssignmentMode> for Mode {
    fn from(mode: AssignmentMode) -> Self {
        match mode {
            AssignmentMode::Individual => Mode::Individual,
            AssignmentMode::Group => Mode::Group,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RosterRow {
    pub usn: String,
    pub name: String,
}

impl From<RosterEntry> for RosterRow {
    fn from(entry: RosterEntry) -> Self {
        Self {
            usn: entry.usn,
            name: entry.name,
        }
    }
}

fn default_group_size() -> usize {
    2
}

#[derive(Deserialize, ToSchema)]
pub struct CreateClassRequest {
    pub subject: String,
    pub section: String,
    pub assignment_mode: Mode,
    /// Ignored in individual mode.
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    pub students: Vec<RosterRow>,
    pub topics: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ClassResponse {
    pub id: String,
    pub subject: String,
    pub section: String,
    pub assignment_mode: Mode,
    pub group_size: usize,
    pub topics: Vec<String>,
    pub student_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<Class> for ClassResponse {
    fn from(class: Class) -> Self {
        Self {
            id: class.id,
            subject: class.subject,
            section: class.section,
            assignment_mode: class.assignment_mode.into(),
            group_size: class.group_size,
            topics: class.topics,
            student_count: class.student_count,
            created_at: class.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub usn: String,
    pub name: String,
    pub section: String,
    pub group_members: Vec<String>,
    pub assigned_topic: Option<String>,
    pub assigned_by: Option<String>,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            usn: student.usn,
            name: student.name,
            section: student.section,
            group_members: student.group_members,
            assigned_topic: student.assigned_topic,
            assigned_by: student.assigned_by,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StudentListResponse {
    pub students: Vec<StudentResponse>,
    pub assigned: usize,
    pub unassigned: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DeletionResponse {
    pub class_id: String,
    pub students_removed: usize,
    /// Steps that failed; the rest of the deletion still ran.
    pub failed_steps: Vec<String>,
}

impl From<DeletionReport> for DeletionResponse {
    fn from(report: DeletionReport) -> Self {
        Self {
            class_id: report.class_id,
            students_removed: report.students_removed,
            failed_steps: report.failed_steps,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentsQuery {
    /// `all` (default), `assigned` or `unassigned`.
    pub filter: Option<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List the signed-in lecturer's classes in creation order.
#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Classes of the lecturer", body = [ClassResponse]),
        (status = 401, description = "No active session")
    )
)]
pub async fn list_classes_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<Vec<ClassResponse>>, (StatusCode, String)> {
    let classes = state
        .classes
        .list_classes(&user)
        .await
        .map_err(service_error)?;
    Ok(Json(classes.into_iter().map(ClassResponse::from).collect()))
}

/// Create a class, its student records and groups.
#[utoipa::path(
    post,
    path = "/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Empty roster, empty topic list or bad group size"),
        (status = 401, description = "No active session")
    )
)]
pub async fn create_class_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(req): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let new = NewClass {
        subject: req.subject,
        section: req.section,
        assignment_mode: req.assignment_mode.into(),
        group_size: req.group_size,
        students: req
            .students
            .into_iter()
            .map(|r| RosterEntry {
                usn: r.usn,
                name: r.name,
            })
            .collect(),
        topics: req.topics,
    };
    let class = state
        .classes
        .create_class(&user, new)
        .await
        .map_err(service_error)?;
    Ok((StatusCode::CREATED, Json(ClassResponse::from(class))))
}

#[utoipa::path(
    get,
    path = "/classes/{id}",
    params(("id" = String, Path, description = "Class identifier")),
    responses(
        (status = 200, description = "The class", body = ClassResponse),
        (status = 401, description = "Not signed in, or not the owner"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn get_class_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> Result<Json<ClassResponse>, (StatusCode, String)> {
    let class = state
        .classes
        .get_class(&user, &id)
        .await
        .map_err(service_error)?;
    Ok(Json(class.into()))
}

/// Delete a class with its students and indexes, continuing past failed steps.
#[utoipa::path(
    delete,
    path = "/classes/{id}",
    params(("id" = String, Path, description = "Class identifier")),
    responses(
        (status = 200, description = "Deletion report", body = DeletionResponse),
        (status = 401, description = "Not signed in, or not the owner")
    )
)]
pub async fn delete_class_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletionResponse>, (StatusCode, String)> {
    let report = state
        .classes
        .delete_class(&user, &id)
        .await
        .map_err(service_error)?;
    Ok(Json(report.into()))
}

#[utoipa::path(
    get,
    path = "/classes/{id}/students",
    params(
        ("id" = String, Path, description = "Class identifier"),
        StudentsQuery
    ),
    responses(
        (status = 200, description = "Roster with assignment counts", body = StudentListResponse),
        (status = 401, description = "Not signed in, or not the owner"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn list_students_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
    Query(query): Query<StudentsQuery>,
) -> Result<Json<StudentListResponse>, (StatusCode, String)> {
    let filter = query
        .filter
        .as_deref()
        .unwrap_or("all")
        .parse::<StudentFilter>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let listing = state
        .classes
        .list_students(&user, &id, filter)
        .await
        .map_err(service_error)?;
    Ok(Json(StudentListResponse {
        students: listing
            .students
            .into_iter()
            .map(StudentResponse::from)
            .collect(),
        assigned: listing.assigned,
        unassigned: listing.unassigned,
    }))
}

/// Download the assignment sheet as CSV.
#[utoipa::path(
    get,
    path = "/classes/{id}/export",
    params(("id" = String, Path, description = "Class identifier")),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 401, description = "Not signed in, or not the owner"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn export_class_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let export = state
        .classes
        .export_csv(&user, &id)
        .await
        .map_err(service_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.content,
    ))
}

/// Clear the topic of a student and their whole group.
#[utoipa::path(
    post,
    path = "/students/{usn}/reset",
    params(("usn" = String, Path, description = "University seat number")),
    responses(
        (status = 200, description = "Student after the reset", body = StudentResponse),
        (status = 401, description = "Not signed in, or not the owner"),
        (status = 404, description = "USN not found")
    )
)]
pub async fn reset_assignment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(usn): Path<String>,
) -> Result<Json<StudentResponse>, (StatusCode, String)> {
    let student = state
        .classes
        .reset_assignment(&user, &usn)
        .await
        .map_err(service_error)?;
    Ok(Json(student.into()))
}
