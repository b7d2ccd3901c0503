//! Submission status state machine.
//!
//! ```text
//! draft -> awaiting_pro -> awaiting_leader -> awaiting_pro_to_post -> posted
//!               |                 |
//!               +-> posted        +-> rejected
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Lifecycle state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    AwaitingPro,
    AwaitingLeader,
    AwaitingProToPost,
    Posted,
    Rejected,
}

/// Something an actor does to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// Team member hands the draft to the PRO.
    MarkReady,
    /// PRO asks a team leader to approve.
    SendForApproval,
    /// Leader approves; the PRO may post.
    Approve,
    /// Leader rejects.
    Reject,
    /// PRO publishes, either directly from review or after approval.
    Post,
}

/// Who may trigger an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Only the team member who submitted it.
    Owner,
    /// Any session whose role rank is at least this role's.
    AtLeast(Role),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown submission status: {0}")]
pub struct UnknownStatus(pub String);

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::AwaitingPro => "awaiting_pro",
            Self::AwaitingLeader => "awaiting_leader",
            Self::AwaitingProToPost => "awaiting_pro_to_post",
            Self::Posted => "posted",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Posted | Self::Rejected)
    }

    /// Target state for `event`, or `None` if the event is not legal here.
    pub fn apply(self, event: SubmissionEvent) -> Option<SubmissionStatus> {
        use SubmissionEvent as E;
        use SubmissionStatus as S;
        match (self, event) {
            (S::Draft, E::MarkReady) => Some(S::AwaitingPro),
            (S::AwaitingPro, E::SendForApproval) => Some(S::AwaitingLeader),
            (S::AwaitingPro, E::Post) => Some(S::Posted),
            (S::AwaitingLeader, E::Approve) => Some(S::AwaitingProToPost),
            (S::AwaitingLeader, E::Reject) => Some(S::Rejected),
            (S::AwaitingProToPost, E::Post) => Some(S::Posted),
            _ => None,
        }
    }

    /// Role whose action is awaited in this state, if any.
    ///
    /// Entering a state with a next actor issues that actor a fresh magic link.
    pub fn next_actor(self) -> Option<Role> {
        match self {
            Self::AwaitingPro | Self::AwaitingProToPost | Self::Rejected => Some(Role::Pro),
            Self::AwaitingLeader => Some(Role::Leader),
            Self::Draft | Self::Posted => None,
        }
    }
}

impl SubmissionEvent {
    pub fn actor(self) -> Actor {
        match self {
            Self::MarkReady => Actor::Owner,
            Self::SendForApproval | Self::Post => Actor::AtLeast(Role::Pro),
            Self::Approve | Self::Reject => Actor::AtLeast(Role::Leader),
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "awaiting_pro" => Ok(Self::AwaitingPro),
            "awaiting_leader" => Ok(Self::AwaitingLeader),
            "awaiting_pro_to_post" => Ok(Self::AwaitingProToPost),
            "posted" => Ok(Self::Posted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}
