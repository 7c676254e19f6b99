use crate::services::auth;
use crate::web::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::RequestPartsExt;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Proof that the request carried the configured admin bearer token.
pub struct AdminAccess;

impl FromRequestParts<Arc<AppState>> for AdminAccess {
    type Rejection = StatusCode;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let expected = state.config.auth.admin_token_hash.clone();
        Box::pin(async move {
            let TypedHeader(Authorization(bearer)) = parts
                .extract::<TypedHeader<Authorization<Bearer>>>()
                .await
                .map_err(|_| StatusCode::UNAUTHORIZED)?;

            if expected.is_none() {
                tracing::warn!("Admin request refused: no admin token configured");
                return Err(StatusCode::UNAUTHORIZED);
            }
            if !auth::verify_token(bearer.token(), expected.as_deref()) {
                return Err(StatusCode::UNAUTHORIZED);
            }

            Ok(AdminAccess)
        })
    }
}
