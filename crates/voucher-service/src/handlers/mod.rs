//! REST API 处理器
//!
//! 认证本身在系统边界之外完成，这里只消费网关注入的不透明身份头：
//! `x-user-id`（必填）、`x-wallet-address` 与 `x-email`（可选）。

pub mod claim;
pub mod voucher;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::VoucherError;

/// 调用方身份
///
/// 从请求头提取的已认证身份信息，作为 axum extractor 在各处理器间复用。
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// 用户身份标识
    pub user_id: String,
    /// 钱包地址（可选）
    pub wallet_address: Option<String>,
    /// 邮箱（可选）
    pub email: Option<String>,
}

impl CallerIdentity {
    /// 领取入账地址：优先钱包地址，未绑定钱包时退回用户身份标识
    pub fn claimant_address(&self) -> String {
        self.wallet_address
            .clone()
            .unwrap_or_else(|| self.user_id.clone())
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = VoucherError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, "x-user-id")
            .ok_or_else(|| VoucherError::Unauthorized("缺少 x-user-id 请求头".to_string()))?;

        Ok(Self {
            user_id,
            wallet_address: header_value(parts, "x-wallet-address"),
            email: header_value(parts, "x-email"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claimant_address_prefers_wallet() {
        let caller = CallerIdentity {
            user_id: "user-1".to_string(),
            wallet_address: Some("0xabc".to_string()),
            email: None,
        };
        assert_eq!(caller.claimant_address(), "0xabc");
    }

    #[test]
    fn test_claimant_address_falls_back_to_user_id() {
        let caller = CallerIdentity {
            user_id: "user-1".to_string(),
            wallet_address: None,
            email: None,
        };
        assert_eq!(caller.claimant_address(), "user-1");
    }
}
