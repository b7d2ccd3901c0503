//! Request-time access-control guards.
//!
//! Each guard takes the resolved session (see [`MaybeSession`](crate::session::MaybeSession))
//! and returns it when authorized. `Unauthenticated` maps to 401, `Forbidden` to 403.

use dmrt_domain::role::Role;
use http::StatusCode;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
}

impl GuardError {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

pub fn require_authenticated(session: Option<Session>) -> Result<Session, GuardError> {
    session.ok_or(GuardError::Unauthenticated)
}

/// Passes when the session's role rank is at least `min`'s.
pub fn require_role(session: Option<Session>, min: Role) -> Result<Session, GuardError> {
    let session = require_authenticated(session)?;
    if !session.role.satisfies(min) {
        return Err(GuardError::Forbidden);
    }
    Ok(session)
}

/// Passes for the resource owner, or for a pro / leader session when the
/// corresponding flag allows it. Role matches here are exact, not ranked.
pub fn check_resource_access(
    session: Option<Session>,
    owner_email: &str,
    allow_pro: bool,
    allow_leader: bool,
) -> Result<Session, GuardError> {
    let session = require_authenticated(session)?;
    let granted = session.email == owner_email
        || (allow_pro && session.role == Role::Pro)
        || (allow_leader && session.role == Role::Leader);
    if granted {
        Ok(session)
    } else {
        Err(GuardError::Forbidden)
    }
}
