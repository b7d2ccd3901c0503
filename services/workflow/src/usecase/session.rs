use dmrt_auth_types::session::SessionManager;
use dmrt_domain::role::Role;

use crate::domain::repository::AuthCodeRepository;
use crate::domain::types::RedeemedCode;
use crate::error::WorkflowError;
use crate::usecase::authcode::{RedeemAuthcodeInput, RedeemAuthcodeUseCase};

pub struct CreateSessionInput {
    pub code: String,
    pub role: Option<Role>,
}

pub struct CreateSessionOutput {
    pub identity: RedeemedCode,
    pub credential: String,
    /// Seconds since epoch.
    pub expires_at: u64,
}

/// Redeem a magic-link code and mint the session credential for its identity.
pub struct CreateSessionUseCase<A: AuthCodeRepository> {
    pub redeem: RedeemAuthcodeUseCase<A>,
    pub sessions: SessionManager,
}

impl<A: AuthCodeRepository> CreateSessionUseCase<A> {
    pub async fn execute(
        &self,
        input: CreateSessionInput,
    ) -> Result<CreateSessionOutput, WorkflowError> {
        let identity = self
            .redeem
            .execute(RedeemAuthcodeInput {
                code: input.code,
                expected_role: input.role,
            })
            .await?
            .ok_or(WorkflowError::InvalidAuthcode)?;

        let (credential, expires_at) = self
            .sessions
            .create(&identity.email, identity.role, identity.submission_id)
            .map_err(|e| WorkflowError::Internal(e.into()))?;

        Ok(CreateSessionOutput {
            identity,
            credential,
            expires_at,
        })
    }
}
