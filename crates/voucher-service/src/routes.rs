//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// 构建凭券相关的路由
pub fn voucher_routes() -> Router<AppState> {
    Router::new()
        // 凭券生命周期
        .route("/vouchers", post(handlers::voucher::create_voucher))
        .route("/vouchers/{id}", get(handlers::voucher::get_voucher))
        .route("/vouchers/{id}/end", post(handlers::voucher::end_voucher))
        .route("/vouchers/{id}", delete(handlers::voucher::delete_voucher))
        // 领取
        .route("/claims", post(handlers::claim::claim_voucher))
}

/// 组装完整应用路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", voucher_routes())
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
