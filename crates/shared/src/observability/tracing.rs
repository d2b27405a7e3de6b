//! 日志与追踪初始化
//!
//! 基于 tracing-subscriber 构建订阅器：环境变量过滤 + 可切换的
//! pretty / JSON 输出格式。

use anyhow::Result;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use super::ObservabilityConfig;

/// Tracing 资源守卫
///
/// 目前不持有需要显式关闭的资源，保留类型是为了与 metrics 守卫
/// 对称，后续接入分布式追踪导出时在 Drop 中做刷新。
pub struct TracingGuard {
    _private: (),
}

/// 初始化 tracing（日志）
///
/// 重复初始化（如并行测试场景）不视为错误，静默忽略。
pub fn init(config: &ObservabilityConfig) -> Result<TracingGuard> {
    // 构建环境过滤器：RUST_LOG 优先，其次使用配置的级别
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // 构建日志层
    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    Ok(TracingGuard { _private: () })
}
