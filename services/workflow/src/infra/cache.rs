use deadpool_redis::Pool;
use deadpool_redis::redis::{self, RedisError};

use crate::domain::repository::RateLimiter;
use crate::error::WorkflowError;

#[derive(Clone)]
pub struct RedisRateLimiter {
    pub pool: Pool,
}

fn rate_limit_key(key: &str) -> String {
    format!("ratelimit:{key}")
}

/// MULTI; SET key 0 EX window NX; INCR key; EXEC
///
/// The counter never exists without a TTL, even if the client drops mid-request.
fn window_hit(key: &str, window_secs: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window_secs)
        .arg("NX")
        .ignore()
        .incr(key, 1u64);
    pipe
}

impl RateLimiter for RedisRateLimiter {
    async fn hit(&self, key: &str, window_secs: u64) -> Result<u64, WorkflowError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| WorkflowError::Internal(e.into()))?;
        let (count,): (u64,) = window_hit(&rate_limit_key(key), window_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: RedisError| WorkflowError::Internal(e.into()))?;
        Ok(count)
    }
}
