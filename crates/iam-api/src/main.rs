//! IAM API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 가입/로그인/토큰 갱신과 principal 관리 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use iam_api::routes::create_api_router;
use iam_api::state::AppState;
use iam_auth::initialize_defaults;
use iam_core::config::AppConfig;
use iam_core::domain::{GroupStore, PermissionStore, RoleStore};
use iam_core::logging::init_logging;
use iam_store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default()?;
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    info!("Starting IAM API server...");

    let store = MemoryStore::new();

    // 시스템 권한/역할/그룹 시딩. 기본 역할이 없으면 가입이 실패하므로
    // 서버 시작 전에 반드시 완료되어야 한다.
    {
        let roles: Arc<dyn RoleStore> = Arc::new(store.clone());
        let groups: Arc<dyn GroupStore> = Arc::new(store.clone());
        let permissions: Arc<dyn PermissionStore> = Arc::new(store.clone());
        initialize_defaults(&roles, &groups, &permissions).await?;
    }

    let state = Arc::new(AppState::from_memory_store(store, &config));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(state, config.server.request_timeout_secs);

    info!(%addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// 전체 라우터 조합.
fn create_router(state: Arc<AppState>, timeout_secs: u64) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(timeout_secs),
        ))
        .layer(CorsLayer::permissive())
}

/// Graceful shutdown 시그널 대기 (Ctrl+C 또는 SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
