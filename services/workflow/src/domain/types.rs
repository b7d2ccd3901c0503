use chrono::{DateTime, Utc};
use dmrt_domain::role::Role;
use dmrt_domain::submission::SubmissionStatus;
use uuid::Uuid;

/// Length of a magic-link code.
pub const AUTHCODE_LEN: usize = 32;
/// Magic-link lifetime: 4 hours.
pub const AUTHCODE_TTL_SECS: i64 = 4 * 60 * 60;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NOTES_LEN: usize = 10_000;
pub const MAX_COMMENT_LEN: usize = 2_000;
pub const MAX_POST_TEXT_LEN: usize = 10_000;

/// One-time magic-link code.
#[derive(Debug, Clone)]
pub struct AuthCode {
    pub id: Uuid,
    pub code: String,
    pub email: String,
    pub role: Role,
    /// Set for leader links issued for a specific submission.
    pub submission_id: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

/// Identity carried by a successfully redeemed code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemedCode {
    pub email: String,
    pub role: Role,
    pub submission_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub submitted_by_email: String,
    pub notes: String,
    pub final_post_text: Option<String>,
    pub edited_by_pro: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
    /// Oldest first.
    pub leader_approvals: Vec<LeaderApproval>,
}

impl Submission {
    /// Text the PRO would publish: their edit, else the generated draft.
    pub fn post_text(&self) -> Option<&str> {
        self.edited_by_pro
            .as_deref()
            .or(self.final_post_text.as_deref())
    }
}

/// A leader's recorded decision on a submission. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderApproval {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub leader_email: String,
    pub approved: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Writes that accompany a status change. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionExtra {
    pub edited_by_pro: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    /// Inserted atomically with the status change.
    pub approval: Option<LeaderApproval>,
}

/// Fixed-window rate-limit settings shared by the auth endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub max_requests: u64,
    pub window_secs: u64,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Structural check only: one `@`, a dotted domain, no whitespace or line breaks.
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Non-blank and at most `max` characters.
pub fn validate_text(text: &str, max: usize) -> bool {
    !text.trim().is_empty() && text.chars().count() <= max
}

/// Email allow-lists per role, normalized to trimmed lowercase.
#[derive(Debug, Clone, Default)]
pub struct RoleDirectory {
    pro: Vec<String>,
    leaders: Vec<String>,
    team: Vec<String>,
}

impl RoleDirectory {
    pub fn new<P, L, T>(pro: P, leaders: L, team: T) -> Self
    where
        P: IntoIterator<Item = String>,
        L: IntoIterator<Item = String>,
        T: IntoIterator<Item = String>,
    {
        fn normalize(list: impl IntoIterator<Item = String>) -> Vec<String> {
            list.into_iter()
                .map(|e| normalize_email(&e))
                .filter(|e| !e.is_empty())
                .collect()
        }
        Self {
            pro: normalize(pro),
            leaders: normalize(leaders),
            team: normalize(team),
        }
    }

    /// Addresses configured for `role`.
    pub fn recipients(&self, role: Role) -> &[String] {
        match role {
            Role::TeamMember => &self.team,
            Role::Pro => &self.pro,
            Role::Leader => &self.leaders,
        }
    }

    /// `true` if `email` may sign in as `role`.
    pub fn allows(&self, email: &str, role: Role) -> bool {
        let email = normalize_email(email);
        self.recipients(role).iter().any(|e| *e == email)
    }
}
