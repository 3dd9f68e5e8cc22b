//! Keycloak side of the login: the authorize redirect and the
//! authorization-code exchange.

use crate::{
    config::AppConfig,
    errors::{BridgeError, BridgeResult},
    models::token::{AccessToken, TokenResponse},
    services::body::{MAX_UPSTREAM_BODY_BYTES, read_limited},
};
use tracing::{debug, warn};
use url::Url;

/// Talks to the OpenID Connect endpoints of one Keycloak realm.
#[derive(Clone)]
pub struct OidcClient {
    http: reqwest::Client,
    token_endpoint: String,
    authorization_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OidcClient {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> BridgeResult<Self> {
        let base = config.oidc_base_url();
        let redirect_uri = config.redirect_uri();

        let mut authorize = Url::parse(&format!("{base}/auth")).map_err(|e| {
            BridgeError::Configuration(format!("invalid authorization endpoint URL: {e}"))
        })?;
        authorize
            .query_pairs_mut()
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid");

        Ok(Self {
            http,
            token_endpoint: format!("{base}/token"),
            authorization_url: authorize.into(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri,
        })
    }

    /// Where the browser is sent to log in. Fixed for the process lifetime.
    pub fn authorization_url(&self) -> &str {
        &self.authorization_url
    }

    /// Trade a single-use authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> BridgeResult<AccessToken> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let resp = self
            .http
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                BridgeError::UpstreamAuth(format!("token request failed: {}", e.without_url()))
            })?;

        let status = resp.status();
        let body = read_limited(resp, MAX_UPSTREAM_BODY_BYTES)
            .await
            .map_err(|e| BridgeError::UpstreamAuth(format!("token response: {e}")))?;
        debug!(%status, "token endpoint answered");

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenResponse>(&body)
                .ok()
                .and_then(|r| r.error_summary())
                .unwrap_or_else(|| "no OAuth error body".to_string());
            warn!(%status, %detail, "token endpoint rejected the authorization code");
            return Err(BridgeError::UpstreamAuth(format!(
                "token endpoint returned {status}: {detail}"
            )));
        }

        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|e| BridgeError::UpstreamAuth(format!("token response is not JSON: {e}")))?
            .into_access_token()
    }
}
