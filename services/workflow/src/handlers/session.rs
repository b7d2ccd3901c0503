use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use dmrt_auth_types::cookie::{clear_session_cookie, set_session_cookie};
use dmrt_auth_types::guard::require_authenticated;
use dmrt_auth_types::session::MaybeSession;
use dmrt_domain::role::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::handlers::ClientIp;
use crate::state::AppState;
use crate::usecase::authcode::RedeemAuthcodeUseCase;
use crate::usecase::session::{CreateSessionInput, CreateSessionUseCase};

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub code: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub valid: bool,
    pub email: String,
    pub role: Role,
    pub submission_id: Option<Uuid>,
    pub expires_at: u64,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub email: String,
    pub role: Role,
    pub submission_id: Option<Uuid>,
    pub expires_at: u64,
}

/// POST /auth/session: redeem a magic-link code and set the session cookie.
pub async fn create_session(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(CookieJar, Json<CreateSessionResponse>), WorkflowError> {
    state
        .rate_limiter()
        .execute(&[format!("session:ip:{ip}")])
        .await?;

    let usecase = CreateSessionUseCase {
        redeem: RedeemAuthcodeUseCase {
            auth_codes: state.auth_code_repo(),
        },
        sessions: state.sessions.clone(),
    };
    let output = usecase
        .execute(CreateSessionInput {
            code: body.code,
            role: body.role,
        })
        .await?;

    let jar = set_session_cookie(jar, output.credential, state.cookie_domain.clone());
    Ok((
        jar,
        Json(CreateSessionResponse {
            valid: true,
            email: output.identity.email,
            role: output.identity.role,
            submission_id: output.identity.submission_id,
            expires_at: output.expires_at,
        }),
    ))
}

/// GET /auth/session
pub async fn get_session(
    MaybeSession(session): MaybeSession,
) -> Result<Json<SessionResponse>, WorkflowError> {
    let session = require_authenticated(session)?;
    Ok(Json(SessionResponse {
        email: session.email,
        role: session.role,
        submission_id: session.submission_id,
        expires_at: session.expires_at,
    }))
}

/// DELETE /auth/session: clear the cookie. The credential itself stays valid until `exp`.
pub async fn delete_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    (
        clear_session_cookie(jar, state.cookie_domain.clone()),
        StatusCode::NO_CONTENT,
    )
}
