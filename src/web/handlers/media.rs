use super::{blocking, json_envelope, json_single, PaginationParams};
use crate::models::MediaAsset;
use crate::services::media::{MediaError, UploadFile};
use crate::web::error::AppResult;
use crate::web::extractors::AdminAccess;
use crate::web::state::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Multipart field carrying the uploaded images.
pub const UPLOAD_FIELD: &str = "images";

/// GET /media/:id/:size
pub async fn serve_variant(
    State(state): State<Arc<AppState>>,
    Path((id, size)): Path<(i64, String)>,
) -> AppResult<Response> {
    let blob = blocking(move || state.media.open_variant(id, &size)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, blob.content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        blob.data,
    )
        .into_response())
}

#[derive(Serialize)]
struct MediaListing {
    #[serde(flatten)]
    media: MediaAsset,
    can_delete: bool,
}

/// GET /admin/media
pub async fn list(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Query(params): Query<PaginationParams>,
) -> AppResult<Response> {
    let (page, per_page, offset) = params.resolve();

    let (items, total) = blocking(move || -> Result<_, MediaError> {
        let total = state.media.count()?;
        let items = state
            .media
            .list(per_page, offset)?
            .into_iter()
            .map(|media| -> Result<MediaListing, MediaError> {
                let can_delete = state.media.can_delete(media.id)?;
                Ok(MediaListing { media, can_delete })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    })
    .await?;

    Ok(json_envelope(items, total, page, per_page).into_response())
}

/// GET /admin/media/:id
pub async fn show(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let (media, references) = blocking(move || -> Result<_, MediaError> {
        Ok((state.media.get(id)?, state.media.references(id)?))
    })
    .await?;

    Ok(json_single(serde_json::json!({
        "media": media,
        "can_delete": references.is_empty(),
        "references": references.references,
    }))
    .into_response())
}

/// POST /admin/media/upload
///
/// Files are ingested one by one; the response lists what was stored and what was skipped.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let max_files = state.media.limits().max_batch_files;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if files.len() == max_files {
            return Err(MediaError::TooManyFiles {
                count: files.len() + 1,
                max: max_files,
            }
            .into());
        }

        let original_name = field.file_name().unwrap_or("unknown").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;

        files.push(UploadFile {
            original_name,
            mime_type,
            data: data.to_vec(),
        });
    }

    let report = blocking(move || state.media.ingest_batch(&files)).await?;

    let status = if report.uploaded.is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(serde_json::json!({
            "uploaded": report.uploaded,
            "failed": report.failed,
            "skipped": report.skipped(),
        })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct MediaDetailsForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub alt_text: String,
}

/// POST /admin/media/:id/update
pub async fn update(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
    Json(form): Json<MediaDetailsForm>,
) -> AppResult<Response> {
    let media = blocking(move || state.media.update_details(id, &form.title, &form.alt_text)).await?;
    Ok(json_single(media).into_response())
}

/// POST /admin/media/:id/delete
pub async fn delete(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    blocking(move || state.media.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
