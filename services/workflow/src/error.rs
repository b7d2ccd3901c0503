use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dmrt_auth_types::guard::GuardError;

/// Workflow service error variants.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("invalid authcode")]
    InvalidAuthcode,
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("email not authorized for role")]
    EmailNotAuthorized,
    #[error("submission not found")]
    SubmissionNotFound,
    #[error("invalid status transition")]
    InvalidTransition,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("too many requests")]
    TooManyRequests,
    #[error("notification failed")]
    NotificationFailed(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl WorkflowError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAuthcode => "INVALID_AUTHCODE",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::EmailNotAuthorized => "EMAIL_NOT_AUTHORIZED",
            Self::SubmissionNotFound => "SUBMISSION_NOT_FOUND",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::NotificationFailed(_) => "NOTIFICATION_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<GuardError> for WorkflowError {
    fn from(e: GuardError) -> Self {
        match e {
            GuardError::Unauthenticated => Self::Unauthenticated,
            GuardError::Forbidden => Self::Forbidden,
        }
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidAuthcode | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::EmailNotAuthorized => StatusCode::FORBIDDEN,
            Self::SubmissionNotFound => StatusCode::NOT_FOUND,
            Self::InvalidTransition => StatusCode::CONFLICT,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::NotificationFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer records every status; only server-side failures carry a chain worth logging.
        match &self {
            Self::Internal(e) => tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error"),
            Self::NotificationFailed(e) => {
                tracing::error!(error = %format!("{e:#}"), kind = "NOTIFICATION_FAILED", "notification failed")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
