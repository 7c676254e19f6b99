pub mod admin;
pub mod media;
pub mod public;

use crate::web::error::{AppError, AppResult};
use axum::response::Json;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl PaginationParams {
    /// `(page, per_page, offset)`, with page numbers starting at 1.
    ///
    /// The offset saturates at `i64::MAX` so it always binds as an SQLite integer.
    pub fn resolve(&self) -> (usize, usize, usize) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(per_page).min(i64::MAX as usize);
        (page, per_page, offset)
    }
}

fn json_envelope<T: Serialize>(
    data: T,
    total: i64,
    page: usize,
    per_page: usize,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": data,
        "meta": {
            "total": total,
            "page": page,
            "per_page": per_page,
        }
    }))
}

fn json_single<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": data,
    }))
}

/// Run store and image work off the async executor.
async fn blocking<T, E, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(work).await?;
    result.map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::media::MediaError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_pagination_defaults_and_clamps() {
        assert_eq!(PaginationParams::default().resolve(), (1, 20, 0));

        let params = PaginationParams {
            page: Some(3),
            per_page: Some(500),
        };
        assert_eq!(params.resolve(), (3, 100, 200));

        let params = PaginationParams {
            page: Some(0),
            per_page: Some(0),
        };
        assert_eq!(params.resolve(), (1, 1, 0));
    }

    #[test]
    fn test_pagination_huge_page_saturates() {
        let params = PaginationParams {
            page: Some(usize::MAX),
            per_page: Some(50),
        };
        assert_eq!(params.resolve(), (usize::MAX, 50, i64::MAX as usize));
    }

    #[tokio::test]
    async fn test_blocking_keeps_domain_error_status() {
        let value = blocking(|| Ok::<_, MediaError>(7)).await.ok();
        assert_eq!(value, Some(7));

        let err = blocking(|| Err::<(), _>(MediaError::NotFound))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
