//! 凭券服务错误类型
//!
//! 定义服务层的业务错误和系统错误。所有业务规则失败以类型化结果返回，
//! 只有存储层基础设施故障属于可重试错误。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::models::VoucherStatus;

/// 凭券服务错误类型
#[derive(Debug, Error)]
pub enum VoucherError {
    // === 领取相关错误 ===
    #[error("凭券不存在: {0}")]
    NotFound(String),

    #[error("凭券不可领取: voucher_id={voucher_id}, status={status}")]
    NotActive {
        voucher_id: String,
        status: VoucherStatus,
    },

    #[error("凭券已过期: {0}")]
    Expired(String),

    #[error("已达到领取上限: voucher_id={voucher_id}, max_per_user={max_per_user}")]
    AlreadyClaimed {
        voucher_id: String,
        max_per_user: u32,
    },

    #[error("凭券已领完: {0}")]
    Exhausted(String),

    #[error("无效的发放金额: {0}")]
    InvalidAmount(f64),

    #[error("资金池余额不足: 需要 {required}, 剩余 {remaining}")]
    InsufficientPool { required: f64, remaining: f64 },

    // === 管理操作错误 ===
    #[error("未授权访问: {0}")]
    Unauthorized(String),

    #[error("权限不足: {operation}")]
    Forbidden { operation: String },

    #[error("凭券未取消，无法删除: {0}")]
    NotCancelled(String),

    #[error("当前进度不允许结束活动: progress={progress:.2}")]
    CannotEnd { progress: f64 },

    // === 存储错误 ===
    #[error("凭券已存在: {0}")]
    AlreadyExists(String),

    #[error("并发冲突，重试次数已用尽")]
    Conflict,

    #[error("存储不可用: {0}")]
    StoreUnavailable(String),

    // === 通用错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 凭券服务 Result 类型别名
pub type Result<T> = std::result::Result<T, VoucherError>;

impl VoucherError {
    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::NotActive { .. } => "NOT_ACTIVE",
            Self::Expired(_) => "EXPIRED",
            Self::AlreadyClaimed { .. } => "ALREADY_CLAIMED",
            Self::Exhausted(_) => "EXHAUSTED",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InsufficientPool { .. } => "INSUFFICIENT_POOL",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::NotCancelled(_) => "NOT_CANCELLED",
            Self::CannotEnd { .. } => "CANNOT_END",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Conflict => "CONFLICT",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 检查是否为可重试的错误
    ///
    /// 仅存储层瞬时故障值得调用方退避重试；业务规则失败重试也不会成功。
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Conflict)
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::StoreUnavailable(_) | Self::Conflict | Self::Internal(_)
        )
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::Validation(_) | Self::InvalidAmount(_) => StatusCode::BAD_REQUEST,

            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,

            // 请求合法但与凭券当前状态冲突
            Self::NotActive { .. }
            | Self::Expired(_)
            | Self::AlreadyClaimed { .. }
            | Self::Exhausted(_)
            | Self::InsufficientPool { .. }
            | Self::NotCancelled(_)
            | Self::CannotEnd { .. }
            | Self::AlreadyExists(_)
            | Self::Conflict => StatusCode::CONFLICT,

            Self::StoreUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for VoucherError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::StoreUnavailable(e) => {
                tracing::error!(error = %e, "存储操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for VoucherError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 sqlx 错误转换
///
/// 存储层基础设施故障统一归为 StoreUnavailable，由调用方退避重试。
impl From<sqlx::Error> for VoucherError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

/// 从 JSON 序列化错误转换
impl From<serde_json::Error> for VoucherError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON 处理错误: {}", err))
    }
}
