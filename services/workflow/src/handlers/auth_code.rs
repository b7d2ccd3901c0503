use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use dmrt_domain::role::Role;
use serde::Deserialize;

use crate::domain::types::normalize_email;
use crate::error::WorkflowError;
use crate::handlers::ClientIp;
use crate::state::AppState;
use crate::usecase::authcode::{RequestAuthcodeInput, RequestAuthcodeUseCase};

#[derive(Deserialize)]
pub struct RequestAuthcodeRequest {
    pub email: String,
    pub role: Role,
}

/// POST /auth/code: mail a magic link to an allow-listed address.
pub async fn request_authcode(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<RequestAuthcodeRequest>,
) -> Result<StatusCode, WorkflowError> {
    let email = normalize_email(&body.email);
    state
        .rate_limiter()
        .execute(&[
            format!("authcode:ip:{ip}"),
            format!("authcode:id:{email}"),
        ])
        .await?;

    let usecase = RequestAuthcodeUseCase {
        issuer: state.issuer(),
        notifier: state.notifier.clone(),
        directory: state.directory.clone(),
        links: state.links.clone(),
    };
    usecase
        .execute(RequestAuthcodeInput {
            email,
            role: body.role,
        })
        .await?;
    Ok(StatusCode::ACCEPTED)
}
