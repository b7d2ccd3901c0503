use anyhow::Context as _;
use serde::Serialize;

use crate::domain::repository::Notifier;
use crate::error::WorkflowError;

/// Sends mail through a Resend-compatible HTTP API.
#[derive(Clone)]
pub struct HttpNotifier {
    pub client: reqwest::Client,
    pub endpoint: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: String,
}

fn render_html(link: &str) -> String {
    format!(
        "<p>Use the link below to continue in DMRT Social Media.</p>\
         <p><a href=\"{link}\">{link}</a></p>\
         <p>This link expires in 4 hours and can only be used once.</p>"
    )
}

impl Notifier for HttpNotifier {
    async fn send(&self, to: &[String], subject: &str, link: &str) -> Result<(), WorkflowError> {
        let body = SendEmailRequest {
            from: &self.from,
            to,
            subject,
            html: render_html(link),
        };
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .context("send email")
            .map_err(WorkflowError::NotificationFailed)?;
        tracing::info!(recipients = to.len(), subject, "email sent");
        Ok(())
    }
}
