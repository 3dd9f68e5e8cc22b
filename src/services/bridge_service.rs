//! BridgeService — the code → token → credentials → session pipeline.
//!
//! Holds one outbound `reqwest::Client` shared by the three upstream clients.
//! Nothing obtained during a login outlives the `complete_login` call.

use crate::{
    config::AppConfig,
    errors::{BridgeError, BridgeResult},
    models::session::SessionCookies,
    services::{
        filestash_service::FilestashClient, oidc_service::OidcClient, sts_service::StsClient,
    },
};
use reqwest::redirect::Policy;
use std::{sync::Arc, time::Duration};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct BridgeService {
    config: Arc<AppConfig>,
    oidc: OidcClient,
    sts: StsClient,
    filestash: FilestashClient,
}

/// Build the process-wide outbound client.
///
/// Redirects are not followed so upstream `Set-Cookie` headers are never lost
/// on an intermediate hop.
pub fn build_http_client(timeout: Duration) -> BridgeResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
        .build()
        .map_err(|e| BridgeError::Configuration(format!("building HTTP client: {e}")))
}

impl BridgeService {
    pub fn new(config: AppConfig) -> BridgeResult<Self> {
        let http = build_http_client(config.upstream_timeout)?;
        Self::with_client(config, http)
    }

    pub fn with_client(config: AppConfig, http: reqwest::Client) -> BridgeResult<Self> {
        Ok(Self {
            oidc: OidcClient::new(http.clone(), &config)?,
            sts: StsClient::new(http.clone(), &config)?,
            filestash: FilestashClient::new(http, &config),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn authorization_url(&self) -> &str {
        self.oidc.authorization_url()
    }

    /// Run the three exchanges for one authorization code.
    ///
    /// Stops at the first failing step; later upstreams are not contacted.
    pub async fn complete_login(&self, code: &str) -> BridgeResult<SessionCookies> {
        let flow_id = Uuid::new_v4();

        async move {
            let token = self
                .oidc
                .exchange_code(code)
                .await
                .inspect_err(|e| warn!(step = "token", error = %e, "login aborted"))?;

            let creds = self
                .sts
                .assume_role_with_web_identity(&token)
                .await
                .inspect_err(|e| warn!(step = "federation", error = %e, "login aborted"))?;
            drop(token);

            let cookies = self
                .filestash
                .create_session(&creds)
                .await
                .inspect_err(|e| warn!(step = "session", error = %e, "login aborted"))?;

            info!(
                access_key_id = %creds.access_key_id,
                "Filestash session established"
            );
            Ok::<_, BridgeError>(cookies)
        }
        .instrument(info_span!("login_flow", %flow_id))
        .await
    }
}
