//! Reverse-proxy awareness.
//!
//! `X-Forwarded-For`, `X-Forwarded-Proto` and `X-Forwarded-Host` are trusted
//! from any peer. The resolved values are stored on the request as
//! [`ForwardedInfo`] and recorded on the request span.

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::{Instrument, debug, info_span};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedInfo {
    /// Original client address: first `X-Forwarded-For` hop, else the socket peer.
    pub client: Option<String>,
    pub proto: Option<String>,
    pub host: Option<String>,
}

impl ForwardedInfo {
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self {
            client: first_value(headers, X_FORWARDED_FOR)
                .or_else(|| peer.map(|addr| addr.ip().to_string())),
            proto: first_value(headers, X_FORWARDED_PROTO),
            host: first_value(headers, X_FORWARDED_HOST),
        }
    }
}

/// First comma-separated entry of a header, trimmed.
fn first_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Middleware attaching [`ForwardedInfo`] and a per-request span.
pub async fn track_forwarded(mut req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let info = ForwardedInfo::from_parts(req.headers(), peer);

    let span = info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        client = info.client.as_deref().unwrap_or("-"),
        proto = info.proto.as_deref().unwrap_or("-"),
        host = info.host.as_deref().unwrap_or("-"),
    );
    req.extensions_mut().insert(info);

    async move {
        let response = next.run(req).await;
        debug!(status = %response.status(), "request finished");
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 10.0.0.2"),
        );
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));
        headers.insert(X_FORWARDED_HOST, HeaderValue::from_static("files.example.com"));

        let peer: SocketAddr = "10.0.0.2:41000".parse().unwrap();
        let info = ForwardedInfo::from_parts(&headers, Some(peer));

        assert_eq!(info.client.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.proto.as_deref(), Some("https"));
        assert_eq!(info.host.as_deref(), Some("files.example.com"));
    }

    #[test]
    fn falls_back_to_socket_peer() {
        let peer: SocketAddr = "192.0.2.10:5555".parse().unwrap();
        let info = ForwardedInfo::from_parts(&HeaderMap::new(), Some(peer));
        assert_eq!(info.client.as_deref(), Some("192.0.2.10"));
        assert_eq!(info.proto, None);

        assert_eq!(
            ForwardedInfo::from_parts(&HeaderMap::new(), None),
            ForwardedInfo::default()
        );
    }
}
