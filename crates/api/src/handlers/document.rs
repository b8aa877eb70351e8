//! Handlers for staged uploads and document downloads.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use domari_core::error::CoreError;
use domari_core::types::DbId;
use domari_db::models::document::{Document, DocumentScope};
use domari_db::repositories::DocumentRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/documents/staged
///
/// Stage one or more `file` fields for later attachment (group-transaction
/// rows reference the returned ids).
pub async fn stage(
    State(state): State<AppState>,
    _user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Vec<Document>>)> {
    let mut documents = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue; // ignore unknown fields
        }
        let filename = field.file_name().unwrap_or("document").to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let stored_path = state
            .storage
            .save(&filename, &data)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let document = DocumentRepo::create(
            &state.pool,
            DocumentScope::Staged,
            None,
            &filename,
            &stored_path,
            content_type.as_deref(),
            data.len() as i64,
        )
        .await?;
        documents.push(document);
    }

    if documents.is_empty() {
        return Err(AppError::BadRequest("Missing required 'file' field".into()));
    }

    Ok((StatusCode::CREATED, Json(documents)))
}

/// GET /api/v1/documents/{id}/download
///
/// Binary response; the original filename travels in `Content-Disposition`.
pub async fn download(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id,
        }))?;

    let data = state
        .storage
        .read(&document.stored_path)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let content_type = document
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let disposition = format!("attachment; filename=\"{}\"", document.filename);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}
