use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use dmrt_core::health::healthz;
use dmrt_core::middleware::{block_bots, request_id_layer, with_security_headers};

use crate::handlers::{
    auth_code::request_authcode,
    health::readyz,
    session::{create_session, delete_session, get_session},
    submission::{
        approve, create_submission, get_submission, list_submissions, mark_ready,
        post_submission, send_for_approval,
    },
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Magic link
        .route("/auth/code", post(request_authcode))
        // Session
        .route("/auth/session", post(create_session))
        .route("/auth/session", get(get_session))
        .route("/auth/session", delete(delete_session))
        // Submissions
        .route("/submissions", post(create_submission))
        .route("/submissions", get(list_submissions))
        .route("/submissions/{id}", get(get_submission))
        .route("/submissions/{id}/ready", post(mark_ready))
        .route("/submissions/{id}/send-for-approval", post(send_for_approval))
        .route("/submissions/{id}/approve", post(approve))
        .route("/submissions/{id}/post", post(post_submission))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(block_bots)),
        );
    with_security_headers(router)
}
