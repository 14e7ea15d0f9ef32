//! Image upload endpoint.

use axum::extract::{Multipart, State};
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::AppState;

/// Location of a stored upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_path: String,
}

/// POST /api/upload - Store the `file` part of a multipart form.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            break;
        }

        let file_path = state
            .uploads
            .save(file_name.as_deref(), content_type.as_deref(), &bytes)
            .await?;
        return success(UploadResponse { file_path });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}
