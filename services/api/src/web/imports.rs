//! services/api/src/web/imports.rs
//!
//! Spreadsheet uploads that pre-fill the class creation form.

use axum::{
    extract::Multipart,
    http::StatusCode,
    response::Json,
};
use seminar_core::import;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::web::classes::RosterRow;
use crate::web::rest::service_error;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ImportedRoster {
    pub students: Vec<RosterRow>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ImportedTopics {
    pub topics: Vec<String>,
}

/// Reads the first file part of a multipart form as UTF-8 text.
async fn read_upload(mut multipart: Multipart) -> Result<String, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;
    let data = field.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;
    String::from_utf8(data.to_vec()).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Uploaded file must be CSV or tab-separated text".to_string(),
        )
    })
}

/// Parse a roster table with `USN` and `Name` columns.
#[utoipa::path(
    post,
    path = "/import/roster",
    request_body(content_type = "multipart/form-data", description = "CSV or TSV file with USN and Name columns."),
    responses(
        (status = 200, description = "Parsed roster", body = ImportedRoster),
        (status = 400, description = "Missing columns or no valid rows")
    )
)]
pub async fn import_roster_handler(
    multipart: Multipart,
) -> Result<Json<ImportedRoster>, (StatusCode, String)> {
    let text = read_upload(multipart).await?;
    let students = import::parse_roster(&text).map_err(service_error)?;
    Ok(Json(ImportedRoster {
        students: students.into_iter().map(RosterRow::from).collect(),
    }))
}

/// Parse a topic table with a `Topic` column.
#[utoipa::path(
    post,
    path = "/import/topics",
    request_body(content_type = "multipart/form-data", description = "CSV or TSV file with a Topic column."),
    responses(
        (status = 200, description = "Parsed topics", body = ImportedTopics),
        (status = 400, description = "Missing column or no valid rows")
    )
)]
pub async fn import_topics_handler(
    multipart: Multipart,
) -> Result<Json<ImportedTopics>, (StatusCode, String)> {
    let text = read_upload(multipart).await?;
    let topics = import::parse_topics(&text).map_err(service_error)?;
    Ok(Json(ImportedTopics { topics }))
}
