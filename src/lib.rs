//! Login bridge between Keycloak, MinIO STS and Filestash.
//!
//! A browser logging in is sent to Keycloak; the returned authorization code
//! is exchanged for an access token, the token for temporary S3 credentials,
//! and the credentials for a Filestash session cookie that is relayed back.

pub mod config;
pub mod errors;
pub mod forwarded;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
