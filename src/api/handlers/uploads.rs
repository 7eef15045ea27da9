use crate::api::error::AppError;
use crate::services::uploads::CleanupOutcome;
use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub path: String,
    pub filename: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CleanupRequest {
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CleanupResponse {
    pub success: bool,
    pub results: Vec<CleanupOutcome>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = Multipart, description = "Image upload, field name `file`"),
    responses(
        (status = 200, description = "File staged in the temp area", body = UploadResponse),
        (status = 400, description = "No file provided"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Not an allowed image type")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "uploads"
)]
pub async fn upload_image(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut staged = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("length limit exceeded") {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::BadRequest(err_msg)
        }
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let original_filename = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("length limit exceeded") {
                AppError::PayloadTooLarge(
                    "Request body exceeds the maximum allowed limit".to_string(),
                )
            } else {
                AppError::BadRequest(err_msg)
            }
        })?;

        staged = Some(
            state
                .storage
                .stage(&original_filename, content_type.as_deref(), &data)
                .await?,
        );
    }

    let staged = staged.ok_or(AppError::BadRequest("No file provided".to_string()))?;

    Ok(Json(UploadResponse {
        success: true,
        path: staged.path,
        filename: staged.filename,
    }))
}

#[utoipa::path(
    post,
    path = "/api/upload/cleanup",
    request_body = CleanupRequest,
    responses(
        (status = 200, description = "Per-path cleanup outcomes", body = CleanupResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "uploads"
)]
pub async fn cleanup_uploads(
    State(state): State<crate::AppState>,
    Json(req): Json<CleanupRequest>,
) -> Result<Json<CleanupResponse>, AppError> {
    let results = state.storage.cleanup(&req.paths).await;

    Ok(Json(CleanupResponse {
        success: true,
        results,
    }))
}
