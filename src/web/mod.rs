mod error;
mod extractors;
mod handlers;
mod routes;
mod state;

pub use error::{AppError, AppResult};
pub use state::AppState;

use crate::{Config, Database};
use anyhow::Result;
use axum::http::StatusCode;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the full application router for `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.upload_body_limit();
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .merge(routes::public_routes())
        .merge(routes::admin_routes(upload_limit))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config, db: Database, addr: &str) -> Result<()> {
    if config.auth.admin_token_hash.is_none() {
        tracing::warn!("No admin token configured; admin routes will refuse every request");
    }

    let state = Arc::new(AppState::new(config, db)?);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::hash_token;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use tower::ServiceExt;

    const TOKEN: &str = "test-admin-token-123";
    const BOUNDARY: &str = "aquarian-test-boundary";

    fn test_app() -> Router {
        let config: Config = toml::from_str(&format!(
            r#"
            [site]
            title = "Test"

            [database]
            path = ":memory:"

            [auth]
            admin_token_hash = "{}"
            "#,
            hash_token(TOKEN)
        ))
        .unwrap();
        let db = Database::open_memory(&format!("web_{}", uuid::Uuid::new_v4().simple())).unwrap();
        db.migrate().unwrap();
        router(Arc::new(AppState::new(config, db).unwrap()))
    }

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 200]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .unwrap();
        buf.into_inner()
    }

    fn multipart_body(files: &[(&str, &str, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, content_type, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn admin(request: axum::http::request::Builder) -> axum::http::request::Builder {
        request.header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(Request::get("/admin/media").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(
                Request::get("/admin/media")
                    .header(header::AUTHORIZATION, "Bearer wrong-token-value")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(admin(Request::get("/admin/media")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_then_serve_variant() {
        let app = test_app();

        let body = multipart_body(&[
            ("pool.jpg", "image/jpeg", jpeg(640, 480)),
            ("notes.txt", "text/plain", b"hello".to_vec()),
        ]);
        let response = app
            .clone()
            .oneshot(
                admin(Request::post("/admin/media/upload"))
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", BOUNDARY),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let report = json_body(response).await;
        assert_eq!(report["skipped"], 1);
        assert_eq!(report["failed"][0]["kind"], "unsupported_type");
        let id = report["uploaded"][0]["id"].as_i64().unwrap();
        assert_eq!(report["uploaded"][0]["sizes"]["thumb"]["width"], 400);

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/media/{}/thumb", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");

        let response = app
            .oneshot(
                Request::get(format!("/media/{}/original", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_referenced_media_conflicts() {
        let app = test_app();

        let body = multipart_body(&[("logo.jpg", "image/jpeg", jpeg(32, 32))]);
        let response = app
            .clone()
            .oneshot(
                admin(Request::post("/admin/media/upload"))
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", BOUNDARY),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let id = json_body(response).await["uploaded"][0]["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(
                admin(Request::post("/admin/settings"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({ "logo_media_id": id }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                admin(Request::post(format!("/admin/media/{}/delete", id)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["error"], "referenced");
        assert_eq!(body["references"][0]["kind"], "settings");
    }

    #[tokio::test]
    async fn test_public_contact_and_missing_product() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/contact")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "name": "Sam",
                            "email": "sam@example.com",
                            "town": "Lakeview",
                            "message": "Interested in a hot tub",
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::get("/api/products/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
