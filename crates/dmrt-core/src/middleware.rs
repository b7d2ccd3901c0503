use std::sync::LazyLock;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use isbot::Bots;
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use uuid::Uuid;

use crate::health::HEALTH_PATHS;

#[derive(Clone, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build the request-id layer. Apply with `.layer(request_id_layer())` in router.
pub fn request_id_layer() -> SetRequestIdLayer<MakeUuidRequestId> {
    SetRequestIdLayer::new(
        HeaderName::from_static("x-request-id"),
        MakeUuidRequestId,
    )
}

const X_ROBOTS_TAG: &str = "x-robots-tag";

/// Add the response headers every page and API response carries:
/// no indexing, no sniffing, no framing, no referrer.
pub fn with_security_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(X_ROBOTS_TAG),
            HeaderValue::from_static("noindex, nofollow, noarchive, nosnippet"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
}

static BOTS: LazyLock<Bots> = LazyLock::new(Bots::default);

/// `true` for an empty User-Agent or one matching a known crawler / HTTP tool.
pub fn is_bot(user_agent: &str) -> bool {
    let user_agent = user_agent.trim();
    user_agent.is_empty() || BOTS.is_bot(user_agent)
}

/// Reject crawler traffic with 403 before it reaches a handler.
///
/// Link-preview bots that fetch a magic link must not be able to redeem it.
/// Health endpoints are exempt. Apply with `axum::middleware::from_fn(block_bots)`.
pub async fn block_bots(request: Request, next: Next) -> Response {
    if HEALTH_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if is_bot(user_agent) {
        tracing::warn!(
            user_agent = %user_agent,
            path = %request.uri().path(),
            "blocking suspected bot request"
        );
        return (
            StatusCode::FORBIDDEN,
            [(
                HeaderName::from_static(X_ROBOTS_TAG),
                HeaderValue::from_static("noindex, nofollow"),
            )],
            "Access Denied",
        )
            .into_response();
    }

    next.run(request).await
}
