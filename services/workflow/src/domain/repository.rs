#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use dmrt_domain::submission::SubmissionStatus;
use uuid::Uuid;

use crate::domain::types::{AuthCode, Submission, TransitionExtra};
use crate::error::WorkflowError;

/// Repository for one-time magic-link codes.
pub trait AuthCodeRepository: Send + Sync {
    async fn create(&self, code: &AuthCode) -> Result<(), WorkflowError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<AuthCode>, WorkflowError>;

    /// Flip `used` from false to true if the code is still unexpired at `now`.
    /// Returns `true` only for the single caller whose update took effect.
    async fn mark_used(&self, code: &str, now: DateTime<Utc>) -> Result<bool, WorkflowError>;
}

pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, submission: &Submission) -> Result<(), WorkflowError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, WorkflowError>;

    /// Newest first, optionally filtered by status.
    async fn list(&self, status: Option<SubmissionStatus>)
    -> Result<Vec<Submission>, WorkflowError>;

    /// Move `id` from `from` to `to`, writing `extra` in the same statement.
    /// Returns `false` when the row is no longer in `from`.
    async fn transition(
        &self,
        id: Uuid,
        from: SubmissionStatus,
        to: SubmissionStatus,
        extra: &TransitionExtra,
    ) -> Result<bool, WorkflowError>;
}

/// Outbound email delivery.
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &[String], subject: &str, link: &str) -> Result<(), WorkflowError>;
}

/// Fixed-window request counter.
pub trait RateLimiter: Send + Sync {
    /// Count one hit against `key` and return the hits in the current window.
    async fn hit(&self, key: &str, window_secs: u64) -> Result<u64, WorkflowError>;
}
