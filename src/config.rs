use crate::errors::{BridgeError, BridgeResult};
use clap::Parser;
use std::{env, fmt, path::PathBuf, time::Duration};
use url::Url;

pub const DEFAULT_API_PREFIX: &str = "/api/minio";

/// Centralized application configuration.
/// Combines the listener flags with the upstream environment table.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upstream_timeout: Duration,
    /// Base URL of the Filestash instance, no trailing slash.
    pub filestash_url: String,
    pub filestash_api_key: String,
    /// Route prefix, starts with `/`, no trailing slash.
    pub api_prefix: String,
    pub keycloak_url: String,
    pub keycloak_realm: String,
    /// STS endpoint, also forwarded to Filestash as the S3 endpoint.
    pub minio_url: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Command-line + environment configuration for the listener.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Keycloak login bridge issuing Filestash sessions backed by MinIO STS credentials")]
pub struct Args {
    /// Host to bind to
    #[arg(long, env = "BRIDGE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "BRIDGE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Timeout applied to every call made to Keycloak, MinIO and Filestash
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,
}

/// Load a `.env` file from the working directory or one of its parents.
///
/// Variables already present in the environment win. A missing file is fine.
pub fn load_env_file() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable .env file");
            None
        }
    }
}

impl AppConfig {
    /// Parse CLI args and the process environment into a validated AppConfig.
    pub fn from_env_and_args() -> BridgeResult<Self> {
        let args = Args::parse();
        Self::from_lookup(args, |key| env::var(key).ok())
    }

    /// Build the config from `args` and a key lookup.
    ///
    /// Fails on the first missing or malformed key, naming it.
    pub fn from_lookup<F>(args: Args, lookup: F) -> BridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            optional(key).ok_or_else(|| {
                BridgeError::Configuration(format!(
                    "missing required environment variable `{key}`"
                ))
            })
        };
        let base_url = |key: &str| -> BridgeResult<String> {
            let raw = required(key)?;
            let parsed = Url::parse(&raw).map_err(|e| {
                BridgeError::Configuration(format!("`{key}` is not a valid URL: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(BridgeError::Configuration(format!(
                    "`{key}` must be an http or https URL, got scheme `{}`",
                    parsed.scheme()
                )));
            }
            Ok(raw.trim_end_matches('/').to_string())
        };

        let api_prefix = match optional("API_PREFIX") {
            None => DEFAULT_API_PREFIX.to_string(),
            Some(prefix) => {
                if !prefix.starts_with('/') {
                    return Err(BridgeError::Configuration(format!(
                        "`API_PREFIX` must start with `/`, got `{prefix}`"
                    )));
                }
                let trimmed = prefix.trim_end_matches('/');
                if trimmed.is_empty() {
                    // `/login` would collide with the top-level redirect.
                    return Err(BridgeError::Configuration(
                        "`API_PREFIX` must not be the root path".into(),
                    ));
                }
                // The router would read these as captures or wildcards.
                if let Some(segment) = trimmed.split('/').find(|s| {
                    s.starts_with(':') || s.starts_with('*') || s.contains(['{', '}'])
                }) {
                    return Err(BridgeError::Configuration(format!(
                        "`API_PREFIX` segment `{segment}` must be a literal path segment"
                    )));
                }
                trimmed.to_string()
            }
        };

        if args.upstream_timeout_secs == 0 {
            return Err(BridgeError::Configuration(
                "upstream timeout must be at least one second".into(),
            ));
        }

        Ok(Self {
            host: args.host,
            port: args.port,
            upstream_timeout: Duration::from_secs(args.upstream_timeout_secs),
            filestash_url: base_url("FILESTASH_URL")?,
            filestash_api_key: required("FILESTASH_API_KEY")?,
            api_prefix,
            keycloak_url: base_url("KEYCLOAK_URL")?,
            keycloak_realm: required("KEYCLOAK_REALM")?,
            minio_url: base_url("MINIO_URL")?,
            client_id: required("MINIO_KEYCLOAK_CLIENT_ID")?,
            client_secret: required("MINIO_KEYCLOAK_CLIENT_SECRET")?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Keycloak's OpenID Connect endpoint root for the configured realm.
    pub fn oidc_base_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect",
            self.keycloak_url, self.keycloak_realm
        )
    }

    /// Public callback URL registered with Keycloak.
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.filestash_url, self.callback_path())
    }

    pub fn login_path(&self) -> String {
        format!("{}/login", self.api_prefix)
    }

    pub fn callback_path(&self) -> String {
        format!("{}/callback", self.api_prefix)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("filestash_url", &self.filestash_url)
            .field("filestash_api_key", &"<redacted>")
            .field("api_prefix", &self.api_prefix)
            .field("keycloak_url", &self.keycloak_url)
            .field("keycloak_realm", &self.keycloak_realm)
            .field("minio_url", &self.minio_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
