use crate::services::content::ContentError;
use crate::services::media::MediaError;
use crate::services::slug::SlugError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

pub struct AppError(anyhow::Error);

impl AppError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self(anyhow::Error::new(StatusMessage {
            status,
            message: message.into(),
        }))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct StatusMessage {
    status: StatusCode,
    message: String,
}

fn media_status(err: &MediaError) -> StatusCode {
    match err {
        MediaError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        MediaError::PayloadTooLarge { .. } | MediaError::TooManyFiles { .. } => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        MediaError::EmptyBatch => StatusCode::BAD_REQUEST,
        MediaError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MediaError::NotFound => StatusCode::NOT_FOUND,
        MediaError::Referenced(_) => StatusCode::CONFLICT,
        MediaError::StorageWrite { .. }
        | MediaError::StorageRead(_)
        | MediaError::StorageDelete { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn content_status(err: &ContentError) -> (StatusCode, &'static str) {
    match err {
        ContentError::Required(_) | ContentError::Invalid(_) => {
            (StatusCode::BAD_REQUEST, "invalid")
        }
        ContentError::Slug(SlugError::Empty(_)) => (StatusCode::BAD_REQUEST, "invalid"),
        ContentError::UnknownMedia(_) => (StatusCode::BAD_REQUEST, "unknown_media"),
        ContentError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        ContentError::SlugConflict(_) => (StatusCode::CONFLICT, "slug_conflict"),
        ContentError::Slug(SlugError::Store(_)) | ContentError::Store(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "storage")
        }
    }
}

fn error_body(status: StatusCode, kind: &str, message: String) -> Response {
    (status, Json(json!({ "error": kind, "message": message }))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = self.0.downcast_ref::<MediaError>() {
            let status = media_status(err);
            if status.is_server_error() {
                tracing::error!("Media error: {:?}", self.0);
                return error_body(status, err.kind(), "Internal server error".to_string());
            }
            let mut body = json!({ "error": err.kind(), "message": err.to_string() });
            if let MediaError::Referenced(report) = err {
                body["references"] = json!(report.references);
            }
            return (status, Json(body)).into_response();
        }

        if let Some(err) = self.0.downcast_ref::<ContentError>() {
            let (status, kind) = content_status(err);
            if status.is_server_error() {
                tracing::error!("Content error: {:?}", self.0);
                return error_body(status, kind, "Internal server error".to_string());
            }
            return error_body(status, kind, err.to_string());
        }

        if let Some(err) = self.0.downcast_ref::<StatusMessage>() {
            return error_body(err.status, "request", err.message.clone());
        }

        if let Some(err) = self.0.downcast_ref::<MultipartError>() {
            return error_body(err.status(), "multipart", err.body_text());
        }

        tracing::error!("Application error: {:?}", self.0);
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal server error".to_string(),
        )
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
