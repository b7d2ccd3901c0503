use std::net::SocketAddr;
use std::sync::Arc;

use dmrt_auth_types::session::SessionManager;
use dmrt_core::config::Config;
use dmrt_core::tracing::init_tracing;
use sea_orm::Database;
use tracing::info;

use dmrt_workflow::config::WorkflowConfig;
use dmrt_workflow::domain::link::LinkBuilder;
use dmrt_workflow::domain::types::{RateLimitSettings, RoleDirectory};
use dmrt_workflow::infra::mail::HttpNotifier;
use dmrt_workflow::router::build_router;
use dmrt_workflow::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = WorkflowConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let sessions = SessionManager::new(&config.session_secret).expect("invalid SESSION_SECRET");
    let links = LinkBuilder::new(&config.app_base_url).expect("invalid APP_BASE_URL");

    let directory = RoleDirectory::new(
        [config.pro_email],
        config.team_leader_emails,
        config.approved_team_emails,
    );
    if directory.recipients(dmrt_domain::role::Role::Leader).is_empty() {
        tracing::warn!("TEAM_LEADER_EMAILS is empty; approvals cannot be requested");
    }

    let notifier = HttpNotifier {
        client: reqwest::Client::new(),
        endpoint: config.mail_api_url,
        api_key: config.mail_api_key,
        from: config.mail_from,
    };

    let state = AppState {
        db,
        redis,
        sessions,
        cookie_domain: config.cookie_domain,
        directory: Arc::new(directory),
        links,
        notifier,
        rate_limit: RateLimitSettings {
            max_requests: config.rate_limit_max_requests,
            window_secs: config.rate_limit_window_secs,
        },
        trust_proxy_headers: config.trust_proxy_headers,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.workflow_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("workflow service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
