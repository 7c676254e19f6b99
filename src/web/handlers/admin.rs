use super::{blocking, json_envelope, json_single, PaginationParams};
use crate::db::StoreError;
use crate::models::{ContactStatus, PortfolioInput, ProductInput, SettingsInput};
use crate::services::content::ContentError;
use crate::services::{contacts, portfolio, products, settings};
use crate::web::error::{AppError, AppResult};
use crate::web::extractors::AdminAccess;
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::sync::Arc;

/// GET /admin
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
) -> AppResult<Response> {
    let summary = blocking(move || -> Result<_, anyhow::Error> {
        let all = products::ProductFilter::default();
        Ok(serde_json::json!({
            "products": products::count_products(&state.db, all)?,
            "portfolio_posts": portfolio::count_posts(&state.db, false)?,
            "media": state.media.count()?,
            "new_contacts": contacts::count_new_contacts(&state.db)?,
        }))
    })
    .await?;
    Ok(json_single(summary).into_response())
}

fn removed_or_not_found(removed: bool) -> AppResult<Response> {
    if removed {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ContentError::NotFound.into())
    }
}

// Products

/// GET /admin/products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Query(params): Query<PaginationParams>,
) -> AppResult<Response> {
    let (page, per_page, offset) = params.resolve();
    let filter = products::ProductFilter::default();

    let (items, total) = blocking(move || -> Result<_, StoreError> {
        Ok((
            products::list_products(&state.db, filter, per_page, offset)?,
            products::count_products(&state.db, filter)?,
        ))
    })
    .await?;

    Ok(json_envelope(items, total, page, per_page).into_response())
}

/// GET /admin/products/:id
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let product = blocking(move || products::get_product(&state.db, id)).await?;
    let product = product.ok_or(ContentError::NotFound)?;
    Ok(json_single(product).into_response())
}

/// POST /admin/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Json(input): Json<ProductInput>,
) -> AppResult<Response> {
    let product =
        blocking(move || products::create_product(&state.db, &state.gate, input)).await?;
    Ok((StatusCode::CREATED, json_single(product)).into_response())
}

/// POST /admin/products/:id
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> AppResult<Response> {
    let product =
        blocking(move || products::update_product(&state.db, &state.gate, id, input)).await?;
    Ok(json_single(product).into_response())
}

/// POST /admin/products/:id/delete
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let removed = blocking(move || products::delete_product(&state.db, id)).await?;
    removed_or_not_found(removed)
}

// Portfolio

/// GET /admin/portfolio
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Query(params): Query<PaginationParams>,
) -> AppResult<Response> {
    let (page, per_page, offset) = params.resolve();

    let (items, total) = blocking(move || -> Result<_, StoreError> {
        Ok((
            portfolio::list_posts(&state.db, false, per_page, offset)?,
            portfolio::count_posts(&state.db, false)?,
        ))
    })
    .await?;

    Ok(json_envelope(items, total, page, per_page).into_response())
}

/// GET /admin/portfolio/:id
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let post = blocking(move || portfolio::get_post(&state.db, id)).await?;
    let post = post.ok_or(ContentError::NotFound)?;
    Ok(json_single(post).into_response())
}

/// POST /admin/portfolio
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Json(input): Json<PortfolioInput>,
) -> AppResult<Response> {
    let post = blocking(move || portfolio::create_post(&state.db, &state.gate, input)).await?;
    Ok((StatusCode::CREATED, json_single(post)).into_response())
}

/// POST /admin/portfolio/:id
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
    Json(input): Json<PortfolioInput>,
) -> AppResult<Response> {
    let post =
        blocking(move || portfolio::update_post(&state.db, &state.gate, id, input)).await?;
    Ok(json_single(post).into_response())
}

/// POST /admin/portfolio/:id/delete
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let removed = blocking(move || portfolio::delete_post(&state.db, id)).await?;
    removed_or_not_found(removed)
}

// Settings

/// GET /admin/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
) -> AppResult<Response> {
    let current = blocking(move || settings::get_settings(&state.db)).await?;
    Ok(json_single(current).into_response())
}

/// POST /admin/settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Json(input): Json<SettingsInput>,
) -> AppResult<Response> {
    let updated =
        blocking(move || settings::update_settings(&state.db, &state.gate, input)).await?;
    Ok(json_single(updated).into_response())
}

// Contacts

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub status: Option<String>,
}

/// GET /admin/contacts
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Query(query): Query<ContactQuery>,
) -> AppResult<Response> {
    let status = match query.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<ContactStatus>().map_err(|_| {
            AppError::status(
                StatusCode::BAD_REQUEST,
                format!("Unknown contact status '{}'", raw),
            )
        })?),
    };
    let (page, per_page, offset) = PaginationParams {
        page: query.page,
        per_page: query.per_page,
    }
    .resolve();

    let (items, total) = blocking(move || -> Result<_, StoreError> {
        Ok((
            contacts::list_contacts(&state.db, status, per_page, offset)?,
            contacts::count_contacts(&state.db, status)?,
        ))
    })
    .await?;

    Ok(json_envelope(items, total, page, per_page).into_response())
}

/// GET /admin/contacts/:id
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let contact = blocking(move || contacts::get_contact(&state.db, id)).await?;
    let contact = contact.ok_or(ContentError::NotFound)?;
    Ok(json_single(contact).into_response())
}

/// POST /admin/contacts/:id/contacted
pub async fn mark_contacted(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let contact = blocking(move || contacts::mark_contacted(&state.db, id)).await?;
    Ok(json_single(contact).into_response())
}

/// POST /admin/contacts/:id/delete
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let removed = blocking(move || contacts::delete_contact(&state.db, id)).await?;
    removed_or_not_found(removed)
}
