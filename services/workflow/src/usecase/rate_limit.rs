use tracing::warn;

use crate::domain::repository::RateLimiter;
use crate::domain::types::RateLimitSettings;
use crate::error::WorkflowError;

pub struct RateLimitUseCase<L: RateLimiter> {
    pub limiter: L,
    pub settings: RateLimitSettings,
}

impl<L: RateLimiter> RateLimitUseCase<L> {
    /// Count one request against every key. Any key over the limit rejects.
    ///
    /// Fails open: if the counter store is unreachable the request proceeds.
    pub async fn execute(&self, keys: &[String]) -> Result<(), WorkflowError> {
        for key in keys {
            match self.limiter.hit(key, self.settings.window_secs).await {
                Ok(count) if count > self.settings.max_requests => {
                    warn!(scope = key_scope(key), count, "rate limit exceeded");
                    return Err(WorkflowError::TooManyRequests);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "rate limiter unavailable, allowing request");
                }
            }
        }
        Ok(())
    }
}

/// `endpoint:kind` prefix of a `endpoint:kind:identifier` key, so addresses
/// and emails stay out of logs.
fn key_scope(key: &str) -> &str {
    match key.match_indices(':').nth(1) {
        Some((end, _)) => &key[..end],
        None => key,
    }
}
