use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use dmrt_auth_types::session::MaybeSession;
use dmrt_core::serde::{to_rfc3339_ms, to_rfc3339_ms_opt};
use dmrt_domain::submission::SubmissionStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{LeaderApproval, Submission};
use crate::error::WorkflowError;
use crate::state::AppState;
use crate::usecase::submission::{
    CreateSubmissionInput, CreateSubmissionUseCase, GetSubmissionUseCase,
    ListSubmissionsUseCase, TransitionCommand, TransitionSubmissionUseCase,
};

// ── Request / response types ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateSubmissionRequest {
    pub notes: String,
    #[serde(default)]
    pub final_post_text: Option<String>,
}

#[derive(Serialize)]
pub struct CreateSubmissionResponse {
    pub id: Uuid,
}

#[derive(Deserialize)]
pub struct ListSubmissionsQuery {
    pub status: Option<SubmissionStatus>,
}

#[derive(Deserialize)]
pub struct SendForApprovalRequest {
    #[serde(default)]
    pub edited_post_text: Option<String>,
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub approved: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub submitted_by_email: String,
    pub notes: String,
    pub final_post_text: Option<String>,
    pub edited_by_pro: Option<String>,
    pub status: SubmissionStatus,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms_opt")]
    pub posted_at: Option<DateTime<Utc>>,
    pub leader_approvals: Vec<LeaderApprovalResponse>,
}

#[derive(Serialize)]
pub struct LeaderApprovalResponse {
    pub id: Uuid,
    pub leader_email: String,
    pub approved: bool,
    pub comment: Option<String>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<LeaderApproval> for LeaderApprovalResponse {
    fn from(a: LeaderApproval) -> Self {
        Self {
            id: a.id,
            leader_email: a.leader_email,
            approved: a.approved,
            comment: a.comment,
            created_at: a.created_at,
        }
    }
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            submitted_by_email: s.submitted_by_email,
            notes: s.notes,
            final_post_text: s.final_post_text,
            edited_by_pro: s.edited_by_pro,
            status: s.status,
            created_at: s.created_at,
            updated_at: s.updated_at,
            posted_at: s.posted_at,
            leader_approvals: s.leader_approvals.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct TransitionResponse {
    pub id: Uuid,
    pub status: SubmissionStatus,
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// POST /submissions
pub async fn create_submission(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    Json(body): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<CreateSubmissionResponse>), WorkflowError> {
    let usecase = CreateSubmissionUseCase {
        submissions: state.submission_repo(),
    };
    let id = usecase
        .execute(
            session,
            CreateSubmissionInput {
                notes: body.notes,
                final_post_text: body.final_post_text,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CreateSubmissionResponse { id })))
}

/// GET /submissions?status=
pub async fn list_submissions(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<Vec<SubmissionResponse>>, WorkflowError> {
    let usecase = ListSubmissionsUseCase {
        submissions: state.submission_repo(),
    };
    let submissions = usecase.execute(session, query.status).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// GET /submissions/{id}
pub async fn get_submission(
    MaybeSession(session): MaybeSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionResponse>, WorkflowError> {
    let usecase = GetSubmissionUseCase {
        submissions: state.submission_repo(),
    };
    let submission = usecase.execute(session, id).await?;
    Ok(Json(submission.into()))
}

async fn transition(
    state: AppState,
    session: MaybeSession,
    id: Uuid,
    command: TransitionCommand,
) -> Result<Json<TransitionResponse>, WorkflowError> {
    let usecase = TransitionSubmissionUseCase {
        submissions: state.submission_repo(),
        issuer: state.issuer(),
        notifier: state.notifier.clone(),
        directory: state.directory.clone(),
        links: state.links.clone(),
    };
    let status = usecase.execute(session.0, id, command).await?;
    Ok(Json(TransitionResponse { id, status }))
}

/// POST /submissions/{id}/ready: owner hands the draft to the PRO.
pub async fn mark_ready(
    session: MaybeSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, WorkflowError> {
    transition(state, session, id, TransitionCommand::MarkReady).await
}

/// POST /submissions/{id}/send-for-approval
pub async fn send_for_approval(
    session: MaybeSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<SendForApprovalRequest>>,
) -> Result<Json<TransitionResponse>, WorkflowError> {
    // Body is optional: the PRO may forward the text unedited.
    let command = TransitionCommand::SendForApproval {
        edited_post_text: body.and_then(|Json(b)| b.edited_post_text),
    };
    transition(state, session, id, command).await
}

/// POST /submissions/{id}/approve: leader decision, `approved: false` rejects.
pub async fn approve(
    session: MaybeSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<TransitionResponse>, WorkflowError> {
    let command = TransitionCommand::Decide {
        approved: body.approved,
        comment: body.comment,
    };
    transition(state, session, id, command).await
}

/// POST /submissions/{id}/post
pub async fn post_submission(
    session: MaybeSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, WorkflowError> {
    transition(state, session, id, TransitionCommand::Post).await
}
