//! 凭券分发服务
//!
//! REST 服务入口：凭券的创建、领取与生命周期管理。

use anyhow::{bail, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use voucher_shared::{config::AppConfig, database::Database, observability};

use voucher_service::{
    notification::{NotificationSender, TracingEmitter},
    routes,
    service::{CampaignService, ClaimService},
    state::AppState,
    store::{MemoryVoucherStore, PgVoucherStore, VoucherStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 统一加载配置：从 config/{service_name}.toml 加载，包含可观测性配置
    let config = AppConfig::load("voucher-service").unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 2. 从 AppConfig 中提取可观测性配置并注入服务名
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting voucher-service...");
    info!(
        environment = %config.environment,
        store_backend = %config.store.backend,
        "Configuration loaded"
    );

    // 3. 初始化凭券存储
    let store: Arc<dyn VoucherStore> = match config.store.backend.as_str() {
        "postgres" => {
            let db = Database::connect(&config.store.database).await?;
            db.health_check().await?;
            info!("Database connection established");

            let store = PgVoucherStore::new(db.pool().clone());
            store.ensure_schema().await?;
            Arc::new(store)
        }
        "memory" => {
            // 内存存储不具备持久性，仅用于开发与测试环境
            tracing::warn!("Using in-memory voucher store; data will not survive restarts");
            Arc::new(MemoryVoucherStore::new())
        }
        other => bail!("未知的存储后端: {other}"),
    };

    // 4. 初始化通知发送器
    let notification_sender = Arc::new(NotificationSender::new(Arc::new(TracingEmitter::new())));
    info!("Notification sender initialized");

    // 5. 创建服务
    let claim_service = Arc::new(
        ClaimService::new(store.clone()).with_notification_sender(notification_sender),
    );
    let campaign_service = Arc::new(CampaignService::new(store));
    info!("Services initialized");

    // 6. 启动 HTTP 服务
    let state = AppState::new(claim_service, campaign_service);
    let router = routes::build_router(state);

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
///
/// 监听 Ctrl+C 和 SIGTERM 信号，用于 Kubernetes 优雅关闭
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
