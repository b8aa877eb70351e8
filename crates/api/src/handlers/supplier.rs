//! Handlers for the `/suppliers` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use domari_core::error::CoreError;
use domari_core::types::DbId;
use domari_db::models::document::{Document, DocumentScope};
use domari_db::models::supplier::{CreateSupplier, Supplier, UpdateSupplier};
use domari_db::repositories::{DocumentRepo, SupplierRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Query parameters for the supplier listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// `true` (default) hides inactive suppliers.
    pub active: Option<bool>,
}

/// GET /api/v1/suppliers?active=
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Supplier>>> {
    let suppliers = SupplierRepo::list(&state.pool, query.active.unwrap_or(true)).await?;
    Ok(Json(suppliers))
}

/// POST /api/v1/suppliers
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<CreateSupplier>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Supplier name is required".into(),
        )));
    }
    let supplier = SupplierRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// GET /api/v1/suppliers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Supplier>> {
    let supplier = SupplierRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Supplier",
            id,
        }))?;
    Ok(Json(supplier))
}

/// PUT /api/v1/suppliers/{id}
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSupplier>,
) -> AppResult<Json<Supplier>> {
    let supplier = SupplierRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Supplier",
            id,
        }))?;
    Ok(Json(supplier))
}

/// DELETE /api/v1/suppliers/{id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = SupplierRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Supplier",
            id,
        }))
    }
}

/// GET /api/v1/suppliers/{id}/documents
pub async fn list_documents(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<Document>>> {
    SupplierRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Supplier",
            id,
        }))?;
    let documents =
        DocumentRepo::list_for_scope(&state.pool, DocumentScope::Supplier, id).await?;
    Ok(Json(documents))
}

/// POST /api/v1/suppliers/{id}/documents
///
/// Multipart upload of one or more `file` fields, stored and attached to
/// the supplier.
pub async fn upload_documents(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Vec<Document>>)> {
    SupplierRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Supplier",
            id,
        }))?;

    let mut documents = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue;
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
            DocumentScope::Supplier,
            Some(id),
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
