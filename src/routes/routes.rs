//! Defines the routes of the login bridge.
//!
//! ## Structure
//! - `GET /healthz`              — liveness
//! - `GET /login`                — 301 to `{prefix}/login`
//! - `GET {prefix}/login`        — 302 to the Keycloak authorize endpoint
//! - `GET {prefix}/callback`     — code exchange, 302 to `/` with the Filestash cookie
//!
//! `{prefix}` is `API_PREFIX` (default `/api/minio`).

use crate::{
    config::AppConfig,
    forwarded::track_forwarded,
    handlers::{
        auth_handlers::{begin_login, finish_login, redirect_to_login},
        health_handlers::healthz,
    },
    services::bridge_service::BridgeService,
};
use axum::{Router, middleware, routing::get};

/// Build the router for every route, still awaiting its `BridgeService` state.
pub fn routes(config: &AppConfig) -> Router<BridgeService> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", get(redirect_to_login))
        .route(&config.login_path(), get(begin_login))
        .route(&config.callback_path(), get(finish_login))
}

/// The complete application: routes, forwarded-header tracking and state.
pub fn app(service: BridgeService) -> Router {
    routes(service.config())
        .layer(middleware::from_fn(track_forwarded))
        .with_state(service)
}
