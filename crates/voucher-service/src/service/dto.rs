//! 服务层数据传输对象

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DistributionMode, TotalPolicy, Voucher, VoucherStatus};

/// 创建凭券的参数
///
/// 模式相关字段的必填校验由 CampaignService 在创建时执行。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoucherSpec {
    /// 发放的代币符号
    pub token_symbol: String,
    /// 分发模式
    pub mode: DistributionMode,
    /// 资金池策略（Total 模式必填）
    pub total_policy: Option<TotalPolicy>,
    /// 单笔发放金额（PerClaim 模式必填）
    pub per_claim_amount: Option<f64>,
    /// 资金池总额（Total 模式必填）
    pub total_amount: Option<f64>,
    /// 领取次数上限（PerClaim 与 Total/Equal 模式必填）
    pub claim_limit: Option<u32>,
    /// 单个用户最大领取次数，缺省为 1
    pub max_per_user: Option<u32>,
    /// 过期时间字面量（可选），支持多种日期格式
    pub expires_at: Option<String>,
}

impl CreateVoucherSpec {
    /// 固定单笔金额模式
    pub fn per_claim(token_symbol: impl Into<String>, amount: f64, claim_limit: u32) -> Self {
        Self {
            token_symbol: token_symbol.into(),
            mode: DistributionMode::PerClaim,
            total_policy: None,
            per_claim_amount: Some(amount),
            total_amount: None,
            claim_limit: Some(claim_limit),
            max_per_user: None,
            expires_at: None,
        }
    }

    /// 资金池均分模式
    pub fn total_equal(token_symbol: impl Into<String>, total: f64, claim_limit: u32) -> Self {
        Self {
            token_symbol: token_symbol.into(),
            mode: DistributionMode::Total,
            total_policy: Some(TotalPolicy::Equal),
            per_claim_amount: None,
            total_amount: Some(total),
            claim_limit: Some(claim_limit),
            max_per_user: None,
            expires_at: None,
        }
    }

    /// 资金池独占模式（首个领取者拿走全部）
    pub fn total_all(token_symbol: impl Into<String>, total: f64) -> Self {
        Self {
            token_symbol: token_symbol.into(),
            mode: DistributionMode::Total,
            total_policy: Some(TotalPolicy::All),
            per_claim_amount: None,
            total_amount: Some(total),
            claim_limit: None,
            max_per_user: None,
            expires_at: None,
        }
    }

    /// 设置单用户领取次数上限
    pub fn with_max_per_user(mut self, max_per_user: u32) -> Self {
        self.max_per_user = Some(max_per_user);
        self
    }

    /// 设置过期时间字面量
    pub fn with_expires_at(mut self, expires_at: impl Into<String>) -> Self {
        self.expires_at = Some(expires_at.into());
        self
    }
}

/// 领取请求
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    /// 凭券 ID
    pub voucher_id: String,
    /// 领取方地址
    pub claimant_address: String,
    /// 领取方身份标识（可选，用于跨地址去重）
    pub claimant_identity: Option<String>,
}

impl ClaimRequest {
    pub fn new(voucher_id: impl Into<String>, claimant_address: impl Into<String>) -> Self {
        Self {
            voucher_id: voucher_id.into(),
            claimant_address: claimant_address.into(),
            claimant_identity: None,
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.claimant_identity = Some(identity.into());
        self
    }
}

/// 领取结果
///
/// 返回给调用方用于后续的实际代币转账（外部操作）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAward {
    /// 凭券 ID
    pub voucher_id: String,
    /// 本次发放金额
    pub amount: f64,
    /// 代币符号
    pub token_symbol: String,
    /// 领取时间
    pub claimed_at: DateTime<Utc>,
}

/// 凭券对外视图
///
/// 省略完整领取记录，只暴露配置与进度计数。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherPublicView {
    pub id: String,
    pub token_symbol: String,
    pub mode: DistributionMode,
    pub total_policy: Option<TotalPolicy>,
    pub per_claim_amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub claim_limit: Option<u32>,
    pub max_per_user: u32,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: VoucherStatus,
    pub claimed_count: u32,
    pub claimed_total: f64,
    pub remaining_amount: Option<f64>,
    /// 活动进度（0.0 ~ 1.0）
    pub progress: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&Voucher> for VoucherPublicView {
    fn from(voucher: &Voucher) -> Self {
        Self {
            id: voucher.id.clone(),
            token_symbol: voucher.token_symbol.clone(),
            mode: voucher.mode,
            total_policy: voucher.total_policy,
            per_claim_amount: voucher.per_claim_amount,
            total_amount: voucher.total_amount,
            claim_limit: voucher.claim_limit,
            max_per_user: voucher.max_per_user,
            expires_at: voucher.expires_at,
            status: voucher.status,
            claimed_count: voucher.claimed_count,
            claimed_total: voucher.claimed_total,
            remaining_amount: voucher.remaining_amount,
            progress: voucher.progress_ratio(),
            created_at: voucher.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_claim_spec() {
        let spec = CreateVoucherSpec::per_claim("USDT", 5.0, 10);
        assert_eq!(spec.mode, DistributionMode::PerClaim);
        assert_eq!(spec.per_claim_amount, Some(5.0));
        assert_eq!(spec.claim_limit, Some(10));
        assert!(spec.total_policy.is_none());
    }

    #[test]
    fn test_total_specs() {
        let equal = CreateVoucherSpec::total_equal("OP", 100.0, 4);
        assert_eq!(equal.total_policy, Some(TotalPolicy::Equal));
        assert_eq!(equal.total_amount, Some(100.0));

        let all = CreateVoucherSpec::total_all("OP", 57.5);
        assert_eq!(all.total_policy, Some(TotalPolicy::All));
        assert!(all.claim_limit.is_none());
    }

    #[test]
    fn test_spec_builder_methods() {
        let spec = CreateVoucherSpec::per_claim("USDT", 5.0, 10)
            .with_max_per_user(3)
            .with_expires_at("2026-12-31");

        assert_eq!(spec.max_per_user, Some(3));
        assert_eq!(spec.expires_at.as_deref(), Some("2026-12-31"));
    }

    #[test]
    fn test_claim_request_builder() {
        let request = ClaimRequest::new("VCHTEST00001", "0xabc").with_identity("user-1");
        assert_eq!(request.voucher_id, "VCHTEST00001");
        assert_eq!(request.claimant_address, "0xabc");
        assert_eq!(request.claimant_identity.as_deref(), Some("user-1"));
    }
}
