//! Filestash session API payloads.

use crate::models::credentials::StorageCredentials;
use axum::http::HeaderValue;
use serde::Serialize;

/// Body of `POST /api/session` for an S3 backend.
#[derive(Serialize)]
pub struct SessionRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub endpoint: &'a str,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: &'a str,
}

impl<'a> SessionRequest<'a> {
    pub fn s3(endpoint: &'a str, creds: &'a StorageCredentials) -> Self {
        Self {
            kind: "s3",
            endpoint,
            access_key_id: &creds.access_key_id,
            secret_access_key: &creds.secret_access_key,
            session_token: &creds.session_token,
        }
    }
}

/// `Set-Cookie` values issued by Filestash, relayed verbatim and in order.
#[derive(Debug, Clone)]
pub struct SessionCookies(Vec<HeaderValue>);

impl SessionCookies {
    /// `None` when Filestash sent no cookie at all.
    pub fn new(values: Vec<HeaderValue>) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(Self(values))
        }
    }

    pub fn values(&self) -> &[HeaderValue] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<HeaderValue> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn s3_session_body_matches_filestash_shape() {
        let creds = StorageCredentials {
            access_key_id: "A".into(),
            secret_access_key: "B".into(),
            session_token: "C".into(),
            expiration: None,
        };
        let body = serde_json::to_value(SessionRequest::s3("http://minio:9000", &creds)).unwrap();
        assert_eq!(
            body,
            json!({
                "type": "s3",
                "endpoint": "http://minio:9000",
                "access_key_id": "A",
                "secret_access_key": "B",
                "session_token": "C"
            })
        );
    }

    #[test]
    fn no_cookie_means_no_session() {
        assert!(SessionCookies::new(Vec::new()).is_none());
        let cookies =
            SessionCookies::new(vec![HeaderValue::from_static("session=xyz")]).unwrap();
        assert_eq!(cookies.values(), ["session=xyz"]);
    }
}
