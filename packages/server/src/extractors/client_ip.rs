use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// The requesting client's network identity, used as the throttle bucket key.
///
/// Uses the socket peer address. Behind a trusted reverse proxy
/// (`server.trust_forwarded_for = true`) the first `X-Forwarded-For` hop is
/// used instead; the header is never honored otherwise, since a direct
/// client could forge a fresh identity per request or a victim's.
pub struct ClientIp(pub String);

fn resolve_client_ip(parts: &Parts, trust_forwarded_for: bool) -> Result<String, AppError> {
    if trust_forwarded_for
        && let Some(forwarded) = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return Ok(first.to_string());
        }
    }

    let ConnectInfo(addr) = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .ok_or_else(|| AppError::Internal("client address unavailable".into()))?;

    Ok(addr.ip().to_string())
}

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_client_ip(parts, state.config.server.trust_forwarded_for).map(ClientIp)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(forwarded: Option<&str>, peer: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = forwarded {
            builder = builder.header("X-Forwarded-For", value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        if let Some(addr) = peer {
            parts
                .extensions
                .insert(ConnectInfo::<SocketAddr>(addr.parse().unwrap()));
        }
        parts
    }

    #[test]
    fn uses_the_socket_peer_by_default() {
        let parts = parts(None, Some("10.0.0.5:40123"));
        assert_eq!(resolve_client_ip(&parts, false).unwrap(), "10.0.0.5");
    }

    #[test]
    fn ignores_forwarded_header_when_untrusted() {
        // A direct client must not be able to pick its own throttle bucket.
        let parts = parts(Some("1.2.3.4"), Some("10.0.0.5:40123"));
        assert_eq!(resolve_client_ip(&parts, false).unwrap(), "10.0.0.5");
    }

    #[test]
    fn takes_the_first_forwarded_hop_when_trusted() {
        let parts = parts(Some("203.0.113.9, 10.0.0.1"), Some("10.0.0.5:40123"));
        assert_eq!(resolve_client_ip(&parts, true).unwrap(), "203.0.113.9");
    }

    #[test]
    fn blank_forwarded_header_falls_back_to_the_peer() {
        let parts = parts(Some("  "), Some("10.0.0.5:40123"));
        assert_eq!(resolve_client_ip(&parts, true).unwrap(), "10.0.0.5");
    }

    #[test]
    fn missing_peer_address_is_an_error() {
        let parts = parts(None, None);
        assert!(resolve_client_ip(&parts, false).is_err());
    }
}
