//! MinIO STS client for web-identity federation.

use crate::{
    config::AppConfig,
    errors::{BridgeError, BridgeResult},
    models::{
        credentials::{AssumeRoleWithWebIdentityResponse, StorageCredentials, StsErrorResponse},
        token::AccessToken,
    },
    services::body::{MAX_UPSTREAM_BODY_BYTES, read_limited},
};
use tracing::{debug, warn};
use url::Url;

/// STS API version MinIO implements.
pub const STS_API_VERSION: &str = "2011-06-15";

#[derive(Clone)]
pub struct StsClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl StsClient {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> BridgeResult<Self> {
        let endpoint = Url::parse(&config.minio_url).map_err(|e| {
            BridgeError::Configuration(format!("invalid STS endpoint URL: {e}"))
        })?;
        Ok(Self { http, endpoint })
    }

    /// Exchange an OIDC access token for temporary S3 credentials.
    pub async fn assume_role_with_web_identity(
        &self,
        token: &AccessToken,
    ) -> BridgeResult<StorageCredentials> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .query(&[
                ("Action", "AssumeRoleWithWebIdentity"),
                ("WebIdentityToken", token.as_str()),
                ("Version", STS_API_VERSION),
            ])
            .send()
            .await
            .map_err(|e| {
                BridgeError::UpstreamStorage(format!("STS request failed: {}", e.without_url()))
            })?;

        let status = resp.status();
        let body = read_limited(resp, MAX_UPSTREAM_BODY_BYTES)
            .await
            .map_err(|e| BridgeError::UpstreamStorage(format!("STS response: {e}")))?;
        debug!(%status, bytes = body.len(), "STS answered");

        if !status.is_success() {
            let detail = StsErrorResponse::summarize(&body)
                .unwrap_or_else(|| "no STS error body".to_string());
            warn!(%status, %detail, "STS refused the web identity token");
            return Err(BridgeError::UpstreamStorage(format!(
                "STS returned {status}: {detail}"
            )));
        }

        let creds = AssumeRoleWithWebIdentityResponse::from_xml(&body)?.into_credentials()?;
        debug!(
            access_key_id = %creds.access_key_id,
            expiration = creds.expiration.as_deref().unwrap_or("unknown"),
            "obtained temporary storage credentials"
        );
        Ok(creds)
    }
}
