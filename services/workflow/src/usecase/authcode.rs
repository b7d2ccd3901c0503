use std::sync::Arc;

use chrono::{Duration, Utc};
use dmrt_domain::role::Role;
use rand::RngExt;
use tracing::info;
use uuid::Uuid;

use crate::domain::link::LinkBuilder;
use crate::domain::repository::{AuthCodeRepository, Notifier};
use crate::domain::types::{
    AUTHCODE_LEN, AUTHCODE_TTL_SECS, AuthCode, RedeemedCode, RoleDirectory, normalize_email,
    validate_email,
};
use crate::error::WorkflowError;

/// Charset for magic-link codes (mixed-case alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub const LOGIN_SUBJECT: &str = "DMRT Social Media - Your Login Link";

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..AUTHCODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

fn is_well_formed(code: &str) -> bool {
    code.len() == AUTHCODE_LEN && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Mints and stores fresh codes. Shared by login requests and workflow hand-offs.
pub struct AuthcodeIssuer<A: AuthCodeRepository> {
    pub auth_codes: A,
}

impl<A: AuthCodeRepository> AuthcodeIssuer<A> {
    pub async fn issue(
        &self,
        email: &str,
        role: Role,
        submission_id: Option<Uuid>,
    ) -> Result<String, WorkflowError> {
        let code_str = generate_code();
        let now = Utc::now();
        let code = AuthCode {
            id: Uuid::now_v7(),
            code: code_str.clone(),
            email: email.to_owned(),
            role,
            submission_id,
            expires_at: now + Duration::seconds(AUTHCODE_TTL_SECS),
            used: false,
            created_at: now,
        };
        self.auth_codes.create(&code).await?;
        info!(%role, ?submission_id, "authcode issued");
        Ok(code_str)
    }
}

pub struct RequestAuthcodeInput {
    pub email: String,
    pub role: Role,
}

pub struct RequestAuthcodeUseCase<A, N>
where
    A: AuthCodeRepository,
    N: Notifier,
{
    pub issuer: AuthcodeIssuer<A>,
    pub notifier: N,
    pub directory: Arc<RoleDirectory>,
    pub links: LinkBuilder,
}

impl<A, N> RequestAuthcodeUseCase<A, N>
where
    A: AuthCodeRepository,
    N: Notifier,
{
    pub async fn execute(&self, input: RequestAuthcodeInput) -> Result<(), WorkflowError> {
        let email = normalize_email(&input.email);
        if !validate_email(&email) {
            return Err(WorkflowError::InvalidInput("email"));
        }

        // Emails outside the role's allow-list never get a code.
        if !self.directory.allows(&email, input.role) {
            info!(role = %input.role, "authcode refused for unlisted email");
            return Err(WorkflowError::EmailNotAuthorized);
        }

        let code = self.issuer.issue(&email, input.role, None).await?;
        let link = self.links.magic_link(input.role, &code, None);
        self.notifier
            .send(std::slice::from_ref(&email), LOGIN_SUBJECT, &link)
            .await
    }
}

pub struct RedeemAuthcodeInput {
    pub code: String,
    /// When set, a code issued for another role is rejected.
    pub expected_role: Option<Role>,
}

pub struct RedeemAuthcodeUseCase<A: AuthCodeRepository> {
    pub auth_codes: A,
}

impl<A: AuthCodeRepository> RedeemAuthcodeUseCase<A> {
    /// Consume a code. `Ok(None)` for any unknown, used, expired, wrong-role
    /// or concurrently redeemed code; callers must not distinguish these.
    pub async fn execute(
        &self,
        input: RedeemAuthcodeInput,
    ) -> Result<Option<RedeemedCode>, WorkflowError> {
        if !is_well_formed(&input.code) {
            return Ok(None);
        }

        let now = Utc::now();
        let Some(record) = self.auth_codes.find_by_code(&input.code).await? else {
            return Ok(None);
        };
        if record.used || record.expires_at < now {
            return Ok(None);
        }
        if input.expected_role.is_some_and(|role| role != record.role) {
            return Ok(None);
        }

        // Conditional update: of concurrent redeemers only one sees `true`.
        if !self.auth_codes.mark_used(&input.code, now).await? {
            return Ok(None);
        }

        info!(role = %record.role, submission_id = ?record.submission_id, "authcode redeemed");
        Ok(Some(RedeemedCode {
            email: record.email,
            role: record.role,
            submission_id: record.submission_id,
        }))
    }
}
