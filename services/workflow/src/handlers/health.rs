use axum::extract::State;
use axum::http::StatusCode;
use deadpool_redis::redis;
use tracing::warn;

use crate::state::AppState;

/// GET /readyz: 200 once Postgres and Redis both answer, else 503.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    let db_ready = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "readiness: database ping failed");
            false
        }
    };
    let redis_ready = match ping_redis(&state.redis).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "readiness: redis ping failed");
            false
        }
    };

    if db_ready && redis_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn ping_redis(pool: &deadpool_redis::Pool) -> anyhow::Result<()> {
    let mut conn = pool.get().await?;
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
}
