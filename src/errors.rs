use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Every way the login bridge can fail.
///
/// Messages never carry token, credential, client secret or API key values;
/// they are rendered verbatim into the HTTP error body.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The identity provider refused the code or answered with an unexpected shape.
    #[error("identity provider token exchange failed: {0}")]
    UpstreamAuth(String),

    /// The STS federation call failed or returned unusable credentials.
    #[error("storage credential exchange failed: {0}")]
    UpstreamStorage(String),

    /// The file browser did not hand out a session cookie.
    #[error("file browser session could not be established: {0}")]
    SessionEstablish(String),

    #[error("authorization code missing from callback")]
    MissingCode,

    /// Startup validation failure. Fatal before the listener is bound.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::UpstreamAuth(_)
            | BridgeError::UpstreamStorage(_)
            | BridgeError::SessionEstablish(_) => StatusCode::BAD_GATEWAY,
            BridgeError::MissingCode => StatusCode::BAD_REQUEST,
            BridgeError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        assert_eq!(
            BridgeError::UpstreamAuth("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            BridgeError::UpstreamStorage("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            BridgeError::SessionEstablish("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(BridgeError::MissingCode.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_response_is_never_a_redirect() {
        let resp = BridgeError::SessionEstablish("no cookie".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(resp.headers().get(axum::http::header::LOCATION).is_none());
    }
}
