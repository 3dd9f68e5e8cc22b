//! MinIO STS `AssumeRoleWithWebIdentity` payloads.
//!
//! Every element is optional on the wire; presence of the three credential
//! fields is checked in [`AssumeRoleWithWebIdentityResponse::into_credentials`].

use crate::errors::{BridgeError, BridgeResult};
use serde::Deserialize;
use std::fmt;

#[derive(Deserialize)]
pub struct AssumeRoleWithWebIdentityResponse {
    #[serde(rename = "AssumeRoleWithWebIdentityResult", default)]
    pub result: Option<AssumeRoleWithWebIdentityResult>,
}

#[derive(Deserialize)]
pub struct AssumeRoleWithWebIdentityResult {
    #[serde(rename = "Credentials", default)]
    pub credentials: Option<CredentialsElement>,
}

#[derive(Deserialize)]
pub struct CredentialsElement {
    #[serde(rename = "AccessKeyId", default)]
    pub access_key_id: Option<String>,
    #[serde(rename = "SecretAccessKey", default)]
    pub secret_access_key: Option<String>,
    #[serde(rename = "SessionToken", default)]
    pub session_token: Option<String>,
    #[serde(rename = "Expiration", default)]
    pub expiration: Option<String>,
}

impl AssumeRoleWithWebIdentityResponse {
    pub fn from_xml(body: &str) -> BridgeResult<Self> {
        quick_xml::de::from_str(body).map_err(|e| {
            BridgeError::UpstreamStorage(format!("unparsable STS response: {e}"))
        })
    }

    pub fn into_credentials(self) -> BridgeResult<StorageCredentials> {
        let creds = self
            .result
            .and_then(|r| r.credentials)
            .ok_or_else(|| {
                BridgeError::UpstreamStorage(
                    "STS response has no `AssumeRoleWithWebIdentityResult.Credentials`".into(),
                )
            })?;

        Ok(StorageCredentials {
            access_key_id: present("AccessKeyId", creds.access_key_id)?,
            secret_access_key: present("SecretAccessKey", creds.secret_access_key)?,
            session_token: present("SessionToken", creds.session_token)?,
            expiration: creds.expiration,
        })
    }
}

fn present(field: &str, value: Option<String>) -> BridgeResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| BridgeError::UpstreamStorage(format!("STS credentials lack `{field}`")))
}

/// MinIO's XML error envelope (`<ErrorResponse><Error><Code>…`).
#[derive(Deserialize)]
pub struct StsErrorResponse {
    #[serde(rename = "Error", default)]
    pub error: Option<StsErrorDetail>,
}

#[derive(Deserialize)]
pub struct StsErrorDetail {
    #[serde(rename = "Code", default)]
    pub code: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

impl StsErrorResponse {
    /// `Code: Message` from an error body, or `None` when it is not one.
    pub fn summarize(body: &str) -> Option<String> {
        let detail = quick_xml::de::from_str::<Self>(body).ok()?.error?;
        match (detail.code, detail.message) {
            (Some(code), Some(message)) => Some(format!("{code}: {message}")),
            (Some(code), None) => Some(code),
            (None, Some(message)) => Some(message),
            (None, None) => None,
        }
    }
}

/// Temporary S3 credentials issued by the STS.
///
/// Lives only for the callback request that obtained it.
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// Provider-reported expiry, informational only.
    pub expiration: Option<String>,
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIO_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AssumeRoleWithWebIdentityResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <AssumeRoleWithWebIdentityResult>
    <AssumedRoleUser>
      <Arn></Arn>
      <AssumeRoleId></AssumeRoleId>
    </AssumedRoleUser>
    <Credentials>
      <AccessKeyId>Y4RJU1RNFGK48LGO9I2S</AccessKeyId>
      <SecretAccessKey>sYLRKS1Z7hSjluf6gEbb9066hnx315wHTiACPAjg</SecretAccessKey>
      <Expiration>2019-08-08T20:26:12Z</Expiration>
      <SessionToken>eyJhbGciOiJIUzUxMiIsInR5cCI6IkpXVCJ9</SessionToken>
    </Credentials>
    <SubjectFromWebIdentityToken>2f5bd3ee-a4ab-4b79-8e1c-b22ad1d1d2f1</SubjectFromWebIdentityToken>
  </AssumeRoleWithWebIdentityResult>
  <ResponseMetadata>
    <RequestId>15B8A4E1F1D5F66E</RequestId>
  </ResponseMetadata>
</AssumeRoleWithWebIdentityResponse>"#;

    #[test]
    fn parses_minio_credentials() {
        let creds = AssumeRoleWithWebIdentityResponse::from_xml(MINIO_RESPONSE)
            .unwrap()
            .into_credentials()
            .unwrap();
        assert_eq!(creds.access_key_id, "Y4RJU1RNFGK48LGO9I2S");
        assert_eq!(
            creds.secret_access_key,
            "sYLRKS1Z7hSjluf6gEbb9066hnx315wHTiACPAjg"
        );
        assert_eq!(creds.session_token, "eyJhbGciOiJIUzUxMiIsInR5cCI6IkpXVCJ9");
        assert_eq!(creds.expiration.as_deref(), Some("2019-08-08T20:26:12Z"));

        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("sYLRKS1Z7hSjluf6gEbb9066hnx315wHTiACPAjg"));
    }

    #[test]
    fn missing_credentials_element_is_storage_error() {
        let xml = r#"<AssumeRoleWithWebIdentityResponse>
  <AssumeRoleWithWebIdentityResult>
    <SubjectFromWebIdentityToken>someone</SubjectFromWebIdentityToken>
  </AssumeRoleWithWebIdentityResult>
</AssumeRoleWithWebIdentityResponse>"#;
        let err = AssumeRoleWithWebIdentityResponse::from_xml(xml)
            .and_then(|r| r.into_credentials())
            .unwrap_err();
        assert!(matches!(err, BridgeError::UpstreamStorage(_)));
    }

    #[test]
    fn missing_field_is_named() {
        let xml = r#"<AssumeRoleWithWebIdentityResponse>
  <AssumeRoleWithWebIdentityResult>
    <Credentials>
      <AccessKeyId>A</AccessKeyId>
      <SecretAccessKey>B</SecretAccessKey>
    </Credentials>
  </AssumeRoleWithWebIdentityResult>
</AssumeRoleWithWebIdentityResponse>"#;
        let err = AssumeRoleWithWebIdentityResponse::from_xml(xml)
            .and_then(|r| r.into_credentials())
            .unwrap_err();
        assert!(err.to_string().contains("SessionToken"));
    }

    #[test]
    fn summarizes_minio_error_envelope() {
        let xml = r#"<ErrorResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <Error>
    <Type></Type>
    <Code>InvalidParameterValue</Code>
    <Message>Token is expired</Message>
  </Error>
  <RequestId>16A1D2D8C1E7C2E0</RequestId>
</ErrorResponse>"#;
        assert_eq!(
            StsErrorResponse::summarize(xml).as_deref(),
            Some("InvalidParameterValue: Token is expired")
        );
    }
}
