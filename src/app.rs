use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, api_key, catalog, health, method_not_allowed, resources, search, votes};
use crate::middleware::{metrics, rate_limit, versioning};
use crate::state::AppState;

/// Assembles the full application router. All catalog endpoints live under
/// `/api/v1`; the health probe sits at the root and skips the rate limiter.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/resources",
            get(resources::list)
                .post(resources::create)
                .fallback(method_not_allowed),
        )
        .route(
            "/resources/:id",
            get(resources::show)
                .put(resources::update)
                .fallback(method_not_allowed),
        )
        .route(
            "/resources/:id/upvote",
            put(votes::upvote).fallback(method_not_allowed),
        )
        .route(
            "/resources/:id/downvote",
            put(votes::downvote).fallback(method_not_allowed),
        )
        .route(
            "/resources/:id/click",
            put(votes::click).fallback(method_not_allowed),
        )
        .route("/search", get(search::search).fallback(method_not_allowed))
        .route(
            "/languages",
            get(catalog::list_languages).fallback(method_not_allowed),
        )
        .route(
            "/languages/:id",
            get(catalog::show_language).fallback(method_not_allowed),
        )
        .route(
            "/categories",
            get(catalog::list_categories).fallback(method_not_allowed),
        )
        .route(
            "/categories/:id",
            get(catalog::show_category).fallback(method_not_allowed),
        )
        .route("/apikey", post(api_key::issue).fallback(method_not_allowed))
        .route(
            "/apikey/rotate",
            post(api_key::rotate).fallback(method_not_allowed),
        )
        .layer(from_fn_with_state(
            state.clone(),
            versioning::negotiate_version,
        ));

    Router::new()
        .nest("/api/v1", api)
        .route("/healthz", get(health::healthz))
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), rate_limit::rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(metrics::track))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
