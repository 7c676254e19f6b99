use super::handlers;
use super::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::public::health))
        .route("/media/:id/:size", get(handlers::media::serve_variant))
        .route("/api/settings", get(handlers::public::site_settings))
        .route("/api/products", get(handlers::public::list_products))
        .route("/api/products/:slug", get(handlers::public::product))
        .route("/api/portfolio", get(handlers::public::list_portfolio))
        .route("/api/portfolio/:slug", get(handlers::public::portfolio_post))
        .route("/api/contact", post(handlers::public::submit_contact))
}

pub fn admin_routes(upload_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(handlers::admin::dashboard))
        .route("/admin/media", get(handlers::media::list))
        .route(
            "/admin/media/upload",
            post(handlers::media::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/admin/media/:id", get(handlers::media::show))
        .route("/admin/media/:id/update", post(handlers::media::update))
        .route("/admin/media/:id/delete", post(handlers::media::delete))
        .route(
            "/admin/products",
            get(handlers::admin::list_products).post(handlers::admin::create_product),
        )
        .route(
            "/admin/products/:id",
            get(handlers::admin::get_product).post(handlers::admin::update_product),
        )
        .route(
            "/admin/products/:id/delete",
            post(handlers::admin::delete_product),
        )
        .route(
            "/admin/portfolio",
            get(handlers::admin::list_posts).post(handlers::admin::create_post),
        )
        .route(
            "/admin/portfolio/:id",
            get(handlers::admin::get_post).post(handlers::admin::update_post),
        )
        .route(
            "/admin/portfolio/:id/delete",
            post(handlers::admin::delete_post),
        )
        .route(
            "/admin/settings",
            get(handlers::admin::get_settings).post(handlers::admin::update_settings),
        )
        .route("/admin/contacts", get(handlers::admin::list_contacts))
        .route("/admin/contacts/:id", get(handlers::admin::get_contact))
        .route(
            "/admin/contacts/:id/contacted",
            post(handlers::admin::mark_contacted),
        )
        .route(
            "/admin/contacts/:id/delete",
            post(handlers::admin::delete_contact),
        )
}
