//! HTTP handlers for the three login hops.
//! Redirect statuses: 301 for `/login`, 302 for the authorize and success hops.

use crate::{
    errors::BridgeError, forwarded::ForwardedInfo, services::bridge_service::BridgeService,
};
use axum::{
    Extension,
    body::Body,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use tracing::{info, warn};

/// Query string Keycloak appends when redirecting back to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET `/login` — permanent redirect to the prefixed login route.
pub async fn redirect_to_login(State(service): State<BridgeService>) -> Response {
    redirect(StatusCode::MOVED_PERMANENTLY, &service.config().login_path())
}

/// GET `{prefix}/login` — send the browser to Keycloak.
pub async fn begin_login(State(service): State<BridgeService>) -> Response {
    redirect(StatusCode::FOUND, service.authorization_url())
}

/// GET `{prefix}/callback?code=…` — finish the login and hand the
/// Filestash session cookie to the browser.
pub async fn finish_login(
    State(service): State<BridgeService>,
    Extension(forwarded): Extension<ForwardedInfo>,
    Query(q): Query<CallbackQuery>,
) -> Result<Response, BridgeError> {
    if let Some(error) = q.error {
        warn!(%error, description = ?q.error_description, "Keycloak redirected back with an error");
        return Err(BridgeError::UpstreamAuth(format!(
            "authorization was not granted: {error}"
        )));
    }

    let code = q
        .code
        .filter(|c| !c.is_empty())
        .ok_or(BridgeError::MissingCode)?;

    let cookies = service.complete_login(&code).await?;
    info!(client = forwarded.client.as_deref().unwrap_or("unknown"), "login completed");

    let mut response = redirect(StatusCode::FOUND, "/");
    let headers = response.headers_mut();
    for cookie in cookies.into_inner() {
        headers.append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

fn redirect(status: StatusCode, location: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(e) => {
            warn!(error = %e, "redirect target is not a valid header value");
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        }
    }
    response
}
