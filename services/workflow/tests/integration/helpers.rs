use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use dmrt_domain::role::Role;
use dmrt_domain::submission::SubmissionStatus;
use uuid::Uuid;

use dmrt_workflow::domain::link::LinkBuilder;
use dmrt_workflow::domain::repository::{
    AuthCodeRepository, Notifier, RateLimiter, SubmissionRepository,
};
use dmrt_workflow::domain::types::{
    AUTHCODE_TTL_SECS, AuthCode, RoleDirectory, Submission, TransitionExtra,
};
use dmrt_workflow::error::WorkflowError;
use dmrt_workflow::usecase::authcode::AuthcodeIssuer;
use dmrt_workflow::usecase::submission::TransitionSubmissionUseCase;

pub const PRO: &str = "pro@dmrt.org.uk";
pub const LEADER_1: &str = "lead1@dmrt.org.uk";
pub const LEADER_2: &str = "lead2@dmrt.org.uk";
pub const ALICE: &str = "alice@dmrt.org.uk";
pub const BOB: &str = "bob@dmrt.org.uk";
pub const BASE_URL: &str = "https://social.dmrt.org.uk";

pub fn directory() -> Arc<RoleDirectory> {
    Arc::new(RoleDirectory::new(
        [PRO.to_owned()],
        [LEADER_1.to_owned(), LEADER_2.to_owned()],
        [ALICE.to_owned(), BOB.to_owned()],
    ))
}

pub fn links() -> LinkBuilder {
    LinkBuilder::new(BASE_URL).unwrap()
}

// ── MockAuthCodeRepo ─────────────────────────────────────────────────────────

pub struct MockAuthCodeRepo {
    pub codes: Arc<Mutex<Vec<AuthCode>>>,
}

impl MockAuthCodeRepo {
    pub fn new(codes: Vec<AuthCode>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(codes)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns a shared handle to the internal code list for post-execution inspection.
    pub fn codes_handle(&self) -> Arc<Mutex<Vec<AuthCode>>> {
        Arc::clone(&self.codes)
    }
}

impl AuthCodeRepository for MockAuthCodeRepo {
    async fn create(&self, code: &AuthCode) -> Result<(), WorkflowError> {
        self.codes.lock().unwrap().push(code.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<AuthCode>, WorkflowError> {
        let found = self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code)
            .cloned();
        // Let concurrent redeemers read the same snapshot before any of them writes.
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn mark_used(&self, code: &str, now: DateTime<Utc>) -> Result<bool, WorkflowError> {
        let mut codes = self.codes.lock().unwrap();
        match codes
            .iter_mut()
            .find(|c| c.code == code && !c.used && c.expires_at >= now)
        {
            Some(c) => {
                c.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

pub fn auth_code(code: &str, email: &str, role: Role) -> AuthCode {
    let now = Utc::now();
    AuthCode {
        id: Uuid::now_v7(),
        code: code.to_owned(),
        email: email.to_owned(),
        role,
        submission_id: None,
        expires_at: now + Duration::seconds(AUTHCODE_TTL_SECS),
        used: false,
        created_at: now,
    }
}

/// 32-char code built from a short tag, e.g. `code_of("a")`.
pub fn code_of(tag: &str) -> String {
    format!("{tag:A<32}")
}

// ── MockSubmissionRepo ───────────────────────────────────────────────────────

pub struct MockSubmissionRepo {
    pub submissions: Arc<Mutex<Vec<Submission>>>,
}

impl MockSubmissionRepo {
    pub fn new(submissions: Vec<Submission>) -> Self {
        Self {
            submissions: Arc::new(Mutex::new(submissions)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn submissions_handle(&self) -> Arc<Mutex<Vec<Submission>>> {
        Arc::clone(&self.submissions)
    }
}

impl SubmissionRepository for MockSubmissionRepo {
    async fn create(&self, submission: &Submission) -> Result<(), WorkflowError> {
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, WorkflowError> {
        let found = self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned();
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn list(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<Submission>, WorkflowError> {
        let mut list: Vec<Submission> = self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| status.is_none_or(|st| s.status == st))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn transition(
        &self,
        id: Uuid,
        from: SubmissionStatus,
        to: SubmissionStatus,
        extra: &TransitionExtra,
    ) -> Result<bool, WorkflowError> {
        let mut submissions = self.submissions.lock().unwrap();
        let Some(s) = submissions
            .iter_mut()
            .find(|s| s.id == id && s.status == from)
        else {
            return Ok(false);
        };
        s.status = to;
        s.updated_at = Utc::now();
        if let Some(text) = &extra.edited_by_pro {
            s.edited_by_pro = Some(text.clone());
        }
        if let Some(approval) = &extra.approval {
            s.leader_approvals.push(approval.clone());
        }
        if let Some(posted_at) = extra.posted_at {
            s.posted_at = Some(posted_at);
        }
        Ok(true)
    }
}

pub fn submission(owner: &str, status: SubmissionStatus) -> Submission {
    let now = Utc::now();
    Submission {
        id: Uuid::now_v7(),
        submitted_by_email: owner.to_owned(),
        notes: "Callout to Kinder Scout, walker with ankle injury, stretcher carry".to_owned(),
        final_post_text: None,
        edited_by_pro: None,
        status,
        created_at: now,
        updated_at: now,
        posted_at: None,
        leader_approvals: vec![],
    }
}

// ── MockNotifier ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: Vec<String>,
    pub subject: String,
    pub link: String,
}

pub struct MockNotifier {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
    pub fail: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<SentMail>>> {
        Arc::clone(&self.sent)
    }
}

impl Notifier for MockNotifier {
    async fn send(&self, to: &[String], subject: &str, link: &str) -> Result<(), WorkflowError> {
        if self.fail {
            return Err(WorkflowError::NotificationFailed(anyhow::anyhow!(
                "mail API returned 503"
            )));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_vec(),
            subject: subject.to_owned(),
            link: link.to_owned(),
        });
        Ok(())
    }
}

// ── MockRateLimiter ──────────────────────────────────────────────────────────

pub struct MockRateLimiter {
    pub counts: Arc<Mutex<HashMap<String, u64>>>,
    pub fail: bool,
}

impl MockRateLimiter {
    pub fn new() -> Self {
        Self {
            counts: Arc::new(Mutex::new(HashMap::new())),
            fail: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

impl RateLimiter for MockRateLimiter {
    async fn hit(&self, key: &str, _window_secs: u64) -> Result<u64, WorkflowError> {
        if self.fail {
            return Err(WorkflowError::Internal(anyhow::anyhow!("connection refused")));
        }
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(key.to_owned()).or_default();
        *count += 1;
        Ok(*count)
    }
}

// ── Use-case builders ────────────────────────────────────────────────────────

pub fn transition_usecase(
    submissions: MockSubmissionRepo,
    auth_codes: MockAuthCodeRepo,
    notifier: MockNotifier,
) -> TransitionSubmissionUseCase<MockSubmissionRepo, MockAuthCodeRepo, MockNotifier> {
    TransitionSubmissionUseCase {
        submissions,
        issuer: AuthcodeIssuer { auth_codes },
        notifier,
        directory: directory(),
        links: links(),
    }
}

/// Code value carried by a magic link.
pub fn code_in(link: &str) -> String {
    link.rsplit_once("code=").unwrap().1.to_owned()
}
