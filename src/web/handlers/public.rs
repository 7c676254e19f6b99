use super::{blocking, json_envelope, json_single, PaginationParams};
use crate::db::StoreError;
use crate::models::NewContact;
use crate::services::content::ContentError;
use crate::services::{contacts, portfolio, products, settings};
use crate::web::error::AppResult;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::sync::Arc;

/// GET /api/settings
pub async fn site_settings(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let settings = blocking(move || settings::get_settings(&state.db)).await?;
    Ok(json_single(settings).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    #[serde(default)]
    pub featured: bool,
}

/// GET /api/products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Response> {
    let (page, per_page, offset) = PaginationParams {
        page: query.page,
        per_page: query.per_page,
    }
    .resolve();
    let filter = products::ProductFilter {
        published_only: true,
        featured_only: query.featured,
    };

    let (items, total) = blocking(move || -> Result<_, StoreError> {
        Ok((
            products::list_products(&state.db, filter, per_page, offset)?,
            products::count_products(&state.db, filter)?,
        ))
    })
    .await?;

    Ok(json_envelope(items, total, page, per_page).into_response())
}

/// GET /api/products/:slug
pub async fn product(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let product = blocking(move || products::get_product_by_slug(&state.db, &slug)).await?;
    match product {
        Some(product) if product.published => Ok(json_single(product).into_response()),
        _ => Err(ContentError::NotFound.into()),
    }
}

/// GET /api/portfolio
pub async fn list_portfolio(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Response> {
    let (page, per_page, offset) = params.resolve();

    let (items, total) = blocking(move || -> Result<_, StoreError> {
        Ok((
            portfolio::list_posts(&state.db, true, per_page, offset)?,
            portfolio::count_posts(&state.db, true)?,
        ))
    })
    .await?;

    Ok(json_envelope(items, total, page, per_page).into_response())
}

/// GET /api/portfolio/:slug
pub async fn portfolio_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let post = blocking(move || portfolio::get_post_by_slug(&state.db, &slug)).await?;
    match post {
        Some(post) if post.published => Ok(json_single(post).into_response()),
        _ => Err(ContentError::NotFound.into()),
    }
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NewContact>,
) -> AppResult<Response> {
    let contact = blocking(move || contacts::create_contact(&state.db, form)).await?;
    Ok((StatusCode::CREATED, json_single(serde_json::json!({ "id": contact.id }))).into_response())
}

pub async fn health() -> &'static str {
    "ok"
}
