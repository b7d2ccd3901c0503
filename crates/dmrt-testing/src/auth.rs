//! Session helpers for integration tests.
//!
//! Requests through the full router must carry a browser User-Agent (bot
//! filtering) and, for protected routes, a signed `dmrt_session` cookie.
//! `MockSession` mints both from a real [`SessionManager`].

use axum::http::{HeaderMap, HeaderValue, header};
use dmrt_auth_types::cookie::DMRT_SESSION;
use dmrt_auth_types::session::{Session, SessionManager};
use dmrt_domain::role::Role;
use uuid::Uuid;

/// Signing secret for test session managers.
pub const TEST_SESSION_SECRET: &str = "dmrt-test-session-secret-0123456789";

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";

pub const BOT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

pub fn test_session_manager() -> SessionManager {
    SessionManager::new(TEST_SESSION_SECRET).unwrap()
}

/// Identity to sign into test requests.
pub struct MockSession {
    pub email: String,
    pub role: Role,
    pub submission_id: Option<Uuid>,
}

impl MockSession {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            email: email.to_owned(),
            role,
            submission_id: None,
        }
    }

    pub fn scoped_to(mut self, submission_id: Uuid) -> Self {
        self.submission_id = Some(submission_id);
        self
    }

    /// The verified session a handler would see.
    pub fn session(&self) -> Session {
        Session {
            email: self.email.clone(),
            role: self.role,
            submission_id: self.submission_id,
            expires_at: u64::MAX,
        }
    }

    /// `dmrt_session=<credential>` signed by `manager`.
    pub fn cookie(&self, manager: &SessionManager) -> String {
        let (credential, _) = manager
            .create(&self.email, self.role, self.submission_id)
            .unwrap();
        format!("{DMRT_SESSION}={credential}")
    }

    /// Browser User-Agent plus the session cookie.
    pub fn headers(&self, manager: &SessionManager) -> HeaderMap {
        let mut map = browser_headers();
        map.insert(
            header::COOKIE,
            HeaderValue::from_str(&self.cookie(manager)).unwrap(),
        );
        map
    }
}

/// Headers of an anonymous browser request.
pub fn browser_headers() -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(
        header::USER_AGENT,
        HeaderValue::from_static(BROWSER_USER_AGENT),
    );
    map
}
