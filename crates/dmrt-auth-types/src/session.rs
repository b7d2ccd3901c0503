//! Signed session credentials.
//!
//! A session is an HS256 JWT carried in the [`DMRT_SESSION`] cookie. The
//! server keeps no session table: the credential is the only source of
//! identity after a magic link has been redeemed, so it cannot be revoked
//! before `exp`.

use std::convert::Infallible;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::cookie::CookieJar;
use dmrt_domain::role::Role;
use http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cookie::DMRT_SESSION;

/// Session lifetime in seconds (24 hours).
pub const SESSION_TTL_SECS: u64 = 86_400;

/// Minimum accepted length of the signing secret in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Identity carried by a verified session credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub role: Role,
    /// Submission a leader-approval link was scoped to.
    pub submission_id: Option<Uuid>,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub expires_at: u64,
}

/// Errors raised while issuing or decoding a credential.
///
/// [`SessionManager::verify`] collapses every decode error into `None`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("session expired")]
    Expired,
    #[error("malformed credential")]
    Malformed,
    #[error("failed to sign credential")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload of a session credential.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | email address |
/// | `role` | custom | snake_case [`Role`] |
/// | `sid` | custom, optional | submission id the link was scoped to |
/// | `iat` | `iat` | issued at (seconds since epoch) |
/// | `exp` | `exp` | expiration (seconds since epoch) |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<Uuid>,
    pub iat: u64,
    pub exp: u64,
}

/// Issues and verifies session credentials with a server-held secret.
#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl SessionManager {
    pub fn new(secret: &str) -> Result<Self, SessionError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SessionError::WeakSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Issue a credential valid for [`SESSION_TTL_SECS`]. Returns `(token, exp)`.
    pub fn create(
        &self,
        email: &str,
        role: Role,
        submission_id: Option<Uuid>,
    ) -> Result<(String, u64), SessionError> {
        self.create_at(email, role, submission_id, now_secs())
    }

    /// Issue a credential as if minted at `issued_at` (seconds since epoch).
    pub fn create_at(
        &self,
        email: &str,
        role: Role,
        submission_id: Option<Uuid>,
        issued_at: u64,
    ) -> Result<(String, u64), SessionError> {
        let exp = issued_at + SESSION_TTL_SECS;
        let claims = SessionClaims {
            sub: email.to_owned(),
            role,
            sid: submission_id,
            iat: issued_at,
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(SessionError::Signing)?;
        Ok((token, exp))
    }

    /// Verify signature and expiry. Any failure yields `None`.
    pub fn verify(&self, credential: &str) -> Option<Session> {
        match self.decode(credential) {
            Ok(claims) => Some(Session {
                email: claims.sub,
                role: claims.role,
                submission_id: claims.sid,
                expires_at: claims.exp,
            }),
            Err(reason) => {
                tracing::debug!(%reason, "session credential rejected");
                None
            }
        }
    }

    /// Decode and validate a credential, returning raw claims.
    ///
    /// Validation: HS256 only, `exp` checked with zero leeway, `exp` + `sub` required.
    pub fn decode(&self, credential: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(credential, &self.decoding, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                    SessionError::InvalidSignature
                }
                _ => SessionError::Malformed,
            },
        )?;

        Ok(data.claims)
    }
}

/// The verified session of the current request, if any.
///
/// Never rejects: a missing, forged or expired cookie yields `MaybeSession(None)`.
/// Pass the inner value to the [`guard`](crate::guard) functions to authorize.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
    SessionManager: FromRef<S>,
{
    type Rejection = Infallible;

    // Verify synchronously and return a 'static future (see axum-core 0.5 signature).
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let manager = SessionManager::from_ref(state);
        let session = CookieJar::from_headers(&parts.headers)
            .get(DMRT_SESSION)
            .and_then(|cookie| manager.verify(cookie.value()));
        async move { Ok(Self(session)) }
    }
}
