use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::state::AppState;

pub mod auth_code;
pub mod health;
pub mod session;
pub mod submission;

/// Client address used in rate-limit keys.
///
/// Forwarding headers are client-controlled, so they are only read when
/// `trust_proxy_headers` is set. Otherwise the TCP peer is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let ip = client_ip(&parts.headers, peer, state.trust_proxy_headers);
        async move { Ok(Self(ip)) }
    }
}

/// Trusted: first `x-forwarded-for` hop, then `x-real-ip`. Always falls back
/// to the peer address, else `"unknown"`.
pub(crate) fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    let forwarded = || {
        let first_hop = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next());
        let real_ip = headers.get("x-real-ip").and_then(|v| v.to_str().ok());
        first_hop
            .or(real_ip)
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_owned)
    };
    trust_proxy_headers
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_owned())
}
