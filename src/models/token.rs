//! Keycloak token endpoint payloads.

use crate::errors::{BridgeError, BridgeResult};
use serde::Deserialize;
use std::fmt;

/// JSON body returned by the OpenID Connect token endpoint.
///
/// Only the fields the bridge reads are modelled; `error` and
/// `error_description` are the RFC 6749 error envelope.
#[derive(Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Short, secret-free description of an OAuth error body, if any.
    pub fn error_summary(&self) -> Option<String> {
        let code = self.error.as_deref()?;
        Some(match self.error_description.as_deref() {
            Some(desc) => format!("{code} ({desc})"),
            None => code.to_string(),
        })
    }

    pub fn into_access_token(self) -> BridgeResult<AccessToken> {
        if let Some(summary) = self.error_summary() {
            return Err(BridgeError::UpstreamAuth(format!(
                "token endpoint returned error {summary}"
            )));
        }
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken(token)),
            _ => Err(BridgeError::UpstreamAuth(
                "token response has no `access_token`".into(),
            )),
        }
    }
}

/// Bearer token handed to the STS. Never logged.
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}
