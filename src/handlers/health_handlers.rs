//! Liveness handler.
//!
//! - GET /healthz  -> simple liveness ("ok")

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /healthz`
///
/// Always returns 200 OK with a plain JSON body. Never contacts an upstream,
/// so a Keycloak or MinIO outage does not take the bridge out of rotation.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}
