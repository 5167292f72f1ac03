//! Route definitions for the Cube HTTP API.
//!
//! All routes are mounted under `/api` and run inside the auth-context
//! middleware, so every handler sees a session and the request cookies.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(account_routes())
        .merge(user_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_context,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Login, logout, registration, and the current user
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account/login", post(handlers::account::login))
        .route("/account/logout", post(handlers::account::logout))
        .route("/account/register", post(handlers::account::register))
        .route("/account/me", get(handlers::account::me))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::user::create_user))
        .route("/users/{id}", get(handlers::user::get_user))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
