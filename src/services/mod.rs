pub mod body;
pub mod bridge_service;
pub mod filestash_service;
pub mod oidc_service;
pub mod sts_service;
