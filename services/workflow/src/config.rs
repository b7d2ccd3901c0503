use dmrt_core::config::Config;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct WorkflowConfig {
    pub database_url: String,
    pub redis_url: String,
    pub session_secret: String,
    pub cookie_domain: String,
    /// Public origin magic links point at, e.g. `https://social.dmrt.org.uk`.
    pub app_base_url: String,
    pub pro_email: String,
    /// Comma-separated.
    pub team_leader_emails: Vec<String>,
    /// Comma-separated; empty means no team member may request a link.
    #[serde(default)]
    pub approved_team_emails: Vec<String>,
    #[serde(default = "default_mail_api_url")]
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    #[serde(default = "default_port")]
    pub workflow_port: u16,
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u64,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`. Only
    /// enable behind a proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_mail_api_url() -> String {
    "https://api.resend.com/emails".to_owned()
}

fn default_port() -> u16 {
    3120
}

fn default_rate_limit_max_requests() -> u64 {
    5
}

fn default_rate_limit_window_secs() -> u64 {
    15 * 60
}

impl Config for WorkflowConfig {}
