use std::sync::Arc;

use chrono::Utc;
use dmrt_auth_types::guard::{check_resource_access, require_authenticated, require_role};
use dmrt_auth_types::session::Session;
use dmrt_domain::role::Role;
use dmrt_domain::submission::{Actor, SubmissionEvent, SubmissionStatus};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::link::LinkBuilder;
use crate::domain::repository::{AuthCodeRepository, Notifier, SubmissionRepository};
use crate::domain::types::{
    LeaderApproval, MAX_COMMENT_LEN, MAX_NOTES_LEN, MAX_POST_TEXT_LEN, RoleDirectory, Submission,
    TransitionExtra, validate_text,
};
use crate::error::WorkflowError;
use crate::usecase::authcode::AuthcodeIssuer;

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateSubmissionInput {
    pub notes: String,
    pub final_post_text: Option<String>,
}

pub struct CreateSubmissionUseCase<S: SubmissionRepository> {
    pub submissions: S,
}

impl<S: SubmissionRepository> CreateSubmissionUseCase<S> {
    pub async fn execute(
        &self,
        session: Option<Session>,
        input: CreateSubmissionInput,
    ) -> Result<Uuid, WorkflowError> {
        let session = require_authenticated(session)?;
        if !validate_text(&input.notes, MAX_NOTES_LEN) {
            return Err(WorkflowError::InvalidInput("notes"));
        }
        let final_post_text = non_blank(input.final_post_text);
        if final_post_text
            .as_deref()
            .is_some_and(|t| !validate_text(t, MAX_POST_TEXT_LEN))
        {
            return Err(WorkflowError::InvalidInput("final_post_text"));
        }

        let now = Utc::now();
        let submission = Submission {
            id: Uuid::now_v7(),
            submitted_by_email: session.email,
            notes: input.notes,
            final_post_text,
            edited_by_pro: None,
            status: SubmissionStatus::Draft,
            created_at: now,
            updated_at: now,
            posted_at: None,
            leader_approvals: Vec::new(),
        };
        self.submissions.create(&submission).await?;
        info!(submission_id = %submission.id, "submission created");
        Ok(submission.id)
    }
}

// ── Read ─────────────────────────────────────────────────────────────────────

pub struct GetSubmissionUseCase<S: SubmissionRepository> {
    pub submissions: S,
}

impl<S: SubmissionRepository> GetSubmissionUseCase<S> {
    /// Visible to its owner, the PRO and leaders.
    pub async fn execute(
        &self,
        session: Option<Session>,
        id: Uuid,
    ) -> Result<Submission, WorkflowError> {
        let session = require_authenticated(session)?;
        let submission = self
            .submissions
            .find_by_id(id)
            .await?
            .ok_or(WorkflowError::SubmissionNotFound)?;
        check_resource_access(Some(session), &submission.submitted_by_email, true, true)?;
        Ok(submission)
    }
}

pub struct ListSubmissionsUseCase<S: SubmissionRepository> {
    pub submissions: S,
}

impl<S: SubmissionRepository> ListSubmissionsUseCase<S> {
    pub async fn execute(
        &self,
        session: Option<Session>,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>, WorkflowError> {
        require_role(session, Role::Pro)?;
        self.submissions.list(status).await
    }
}

// ── Transitions ──────────────────────────────────────────────────────────────

/// An actor's request to move a submission along.
#[derive(Debug, Clone)]
pub enum TransitionCommand {
    MarkReady,
    SendForApproval { edited_post_text: Option<String> },
    Decide { approved: bool, comment: Option<String> },
    Post,
}

impl TransitionCommand {
    pub fn event(&self) -> SubmissionEvent {
        match self {
            Self::MarkReady => SubmissionEvent::MarkReady,
            Self::SendForApproval { .. } => SubmissionEvent::SendForApproval,
            Self::Decide { approved: true, .. } => SubmissionEvent::Approve,
            Self::Decide { approved: false, .. } => SubmissionEvent::Reject,
            Self::Post => SubmissionEvent::Post,
        }
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        match self {
            Self::SendForApproval {
                edited_post_text: Some(text),
            } if text.chars().count() > MAX_POST_TEXT_LEN => {
                Err(WorkflowError::InvalidInput("edited_post_text"))
            }
            Self::Decide {
                comment: Some(comment),
                ..
            } if comment.chars().count() > MAX_COMMENT_LEN => {
                Err(WorkflowError::InvalidInput("comment"))
            }
            _ => Ok(()),
        }
    }

    fn into_extra(self, submission_id: Uuid, actor_email: &str) -> TransitionExtra {
        match self {
            Self::MarkReady => TransitionExtra::default(),
            Self::SendForApproval { edited_post_text } => TransitionExtra {
                edited_by_pro: non_blank(edited_post_text),
                ..Default::default()
            },
            Self::Decide { approved, comment } => TransitionExtra {
                approval: Some(LeaderApproval {
                    id: Uuid::now_v7(),
                    submission_id,
                    leader_email: actor_email.to_owned(),
                    approved,
                    comment: non_blank(comment),
                    created_at: Utc::now(),
                }),
                ..Default::default()
            },
            Self::Post => TransitionExtra {
                posted_at: Some(Utc::now()),
                ..Default::default()
            },
        }
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

fn notification_subject(status: SubmissionStatus) -> &'static str {
    match status {
        SubmissionStatus::AwaitingPro => "New DMRT Post Ready for Review",
        SubmissionStatus::AwaitingLeader => "DMRT Post Awaiting Your Approval",
        SubmissionStatus::AwaitingProToPost => "Post Approved - Ready to Post",
        SubmissionStatus::Rejected => "Post Rejected",
        SubmissionStatus::Draft | SubmissionStatus::Posted => "DMRT Post Update",
    }
}

pub struct TransitionSubmissionUseCase<S, A, N>
where
    S: SubmissionRepository,
    A: AuthCodeRepository,
    N: Notifier,
{
    pub submissions: S,
    pub issuer: AuthcodeIssuer<A>,
    pub notifier: N,
    pub directory: Arc<RoleDirectory>,
    pub links: LinkBuilder,
}

impl<S, A, N> TransitionSubmissionUseCase<S, A, N>
where
    S: SubmissionRepository,
    A: AuthCodeRepository,
    N: Notifier,
{
    /// Apply `command` and hand the submission to its next actor.
    ///
    /// The status write is conditional on the status that was read, so of two
    /// racing requests for the same transition one fails with `InvalidTransition`.
    /// If the hand-off email cannot be sent the new status stays committed and
    /// `NotificationFailed` is returned.
    pub async fn execute(
        &self,
        session: Option<Session>,
        id: Uuid,
        command: TransitionCommand,
    ) -> Result<SubmissionStatus, WorkflowError> {
        let event = command.event();
        let session = match event.actor() {
            Actor::AtLeast(min) => require_role(session, min)?,
            Actor::Owner => require_authenticated(session)?,
        };
        command.validate()?;

        let submission = self
            .submissions
            .find_by_id(id)
            .await?
            .ok_or(WorkflowError::SubmissionNotFound)?;
        let session = match event.actor() {
            Actor::Owner => check_resource_access(
                Some(session),
                &submission.submitted_by_email,
                false,
                false,
            )?,
            Actor::AtLeast(_) => session,
        };

        let from = submission.status;
        let to = from.apply(event).ok_or(WorkflowError::InvalidTransition)?;
        if event == SubmissionEvent::Post && submission.post_text().is_none() {
            return Err(WorkflowError::InvalidInput("final_post_text"));
        }
        let extra = command.into_extra(id, &session.email);
        if !self.submissions.transition(id, from, to, &extra).await? {
            return Err(WorkflowError::InvalidTransition);
        }
        info!(submission_id = %id, %from, %to, actor_role = %session.role, "submission transitioned");

        if let Some(next) = to.next_actor() {
            self.hand_off(id, to, next).await?;
        }
        Ok(to)
    }

    /// Mail a fresh magic link to everyone holding `role`.
    async fn hand_off(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        role: Role,
    ) -> Result<(), WorkflowError> {
        let recipients = self.directory.recipients(role);
        if recipients.is_empty() {
            warn!(submission_id = %id, %role, "no recipients configured for hand-off");
            return Ok(());
        }
        // Leader links open the approval page of this submission.
        let scope = (role == Role::Leader).then_some(id);
        let subject = notification_subject(status);
        for email in recipients {
            let code = self.issuer.issue(email, role, scope).await?;
            let link = self.links.magic_link(role, &code, scope);
            self.notifier
                .send(std::slice::from_ref(email), subject, &link)
                .await?;
        }
        Ok(())
    }
}
