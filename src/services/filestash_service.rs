//! Filestash session API client.

use crate::{
    config::AppConfig,
    errors::{BridgeError, BridgeResult},
    models::{
        credentials::StorageCredentials,
        session::{SessionCookies, SessionRequest},
    },
};
use axum::http::header::SET_COOKIE;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct FilestashClient {
    http: reqwest::Client,
    session_endpoint: String,
    api_key: String,
    /// S3 endpoint Filestash should talk to with the issued credentials.
    storage_endpoint: String,
}

impl FilestashClient {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http,
            session_endpoint: format!("{}/api/session", config.filestash_url),
            api_key: config.filestash_api_key.clone(),
            storage_endpoint: config.minio_url.clone(),
        }
    }

    /// Open an S3-backed Filestash session and return its cookies.
    pub async fn create_session(&self, creds: &StorageCredentials) -> BridgeResult<SessionCookies> {
        let resp = self
            .http
            .post(&self.session_endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&SessionRequest::s3(&self.storage_endpoint, creds))
            .send()
            .await
            .map_err(|e| {
                BridgeError::SessionEstablish(format!(
                    "session request failed: {}",
                    e.without_url()
                ))
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "Filestash refused the session");
            return Err(BridgeError::SessionEstablish(format!(
                "Filestash returned {status}"
            )));
        }

        let cookies = resp.headers().get_all(SET_COOKIE).iter().cloned().collect();
        let cookies = SessionCookies::new(cookies).ok_or_else(|| {
            BridgeError::SessionEstablish("Filestash response carries no `Set-Cookie`".into())
        })?;
        debug!(count = cookies.values().len(), "Filestash issued session cookies");
        Ok(cookies)
    }
}
