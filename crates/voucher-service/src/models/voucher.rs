//! 凭券实体定义
//!
//! 凭券是一次分发活动的配置与实时领取状态的聚合文档，
//! 是存储层的唯一持久化单元。所有状态变更通过存储层的
//! 原子更新完成，任何组件不得绕过该机制直接修改。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{DistributionMode, TotalPolicy, VoucherStatus};

/// 金额精度：6 位小数
const AMOUNT_SCALE: f64 = 1_000_000.0;

/// 金额归一化到 6 位小数
///
/// 均分计算和资金池扣减后都要经过此函数，避免浮点误差
/// 在多次累加后破坏 `remaining + claimed_total == total` 不变量。
pub fn round_amount(value: f64) -> f64 {
    (value * AMOUNT_SCALE).round() / AMOUNT_SCALE
}

/// 领取记录
///
/// 每次成功领取恰好追加一条，此后不再修改。
/// 既是审计日志，也是 max_per_user 去重的依据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    /// 领取方地址
    pub claimant_address: String,
    /// 领取方身份标识（可选）
    pub claimant_identity: Option<String>,
    /// 本次发放金额
    pub amount: f64,
    /// 领取时间
    pub claimed_at: DateTime<Utc>,
}

/// 凭券
///
/// 一次代币分发活动的完整文档：不可变配置 + 可变领取状态。
/// `version` 字段由存储层维护，用于乐观并发控制。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    /// 凭券 ID（创建时生成的随机字母数字串，不可变）
    pub id: String,
    /// 创建者身份标识，所有管理操作要求匹配此字段
    pub created_by: String,
    /// 发放的代币符号（仅记账用途）
    pub token_symbol: String,
    /// 分发模式，创建后不可变
    pub mode: DistributionMode,
    /// 资金池策略（仅 Total 模式）
    pub total_policy: Option<TotalPolicy>,
    /// 单笔发放金额（PerClaim 模式必填；Total/Equal 模式由创建时预计算）
    pub per_claim_amount: Option<f64>,
    /// 资金池总额（仅 Total 模式）
    pub total_amount: Option<f64>,
    /// 领取次数上限（PerClaim 与 Total/Equal 模式）
    pub claim_limit: Option<u32>,
    /// 单个身份/地址的最大领取次数，最小为 1
    pub max_per_user: u32,
    /// 过期时间（可选）；超过后凭券不再可领取
    pub expires_at: Option<DateTime<Utc>>,
    /// 凭券状态
    pub status: VoucherStatus,
    /// 已成功领取次数
    pub claimed_count: u32,
    /// 累计已发放金额
    pub claimed_total: f64,
    /// 资金池剩余金额（仅 Total 模式）
    /// 不变量：remaining_amount = total_amount - claimed_total，始终 >= 0
    pub remaining_amount: Option<f64>,
    /// 领取记录，仅追加
    pub claims: Vec<ClaimRecord>,
    /// 乐观并发控制版本号
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    /// 有效领取次数上限
    ///
    /// PerClaim 与 Total/Equal 由 claim_limit 决定；
    /// Total/All 隐含上限为 1（首个领取者拿走全部剩余）。
    pub fn claim_ceiling(&self) -> Option<u32> {
        match self.mode {
            DistributionMode::PerClaim => self.claim_limit,
            DistributionMode::Total => match self.total_policy {
                Some(TotalPolicy::All) => Some(1),
                _ => self.claim_limit,
            },
        }
    }

    /// 统计某个地址或身份已成功领取的次数
    ///
    /// 地址与身份任一匹配即计数，防止同一用户换地址重复领取。
    pub fn count_claims_by(&self, address: &str, identity: Option<&str>) -> u32 {
        self.claims
            .iter()
            .filter(|record| {
                record.claimant_address == address
                    || matches!(
                        (identity, record.claimant_identity.as_deref()),
                        (Some(lhs), Some(rhs)) if lhs == rhs
                    )
            })
            .count() as u32
    }

    /// 是否已超过有效期
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    /// 是否已达到发放上限（次数上限或资金池耗尽）
    pub fn has_reached_ceiling(&self) -> bool {
        if let Some(ceiling) = self.claim_ceiling()
            && self.claimed_count >= ceiling
        {
            return true;
        }

        // Total 模式下资金池耗尽也视为达到上限
        self.mode == DistributionMode::Total
            && self.remaining_amount.is_some_and(|remaining| remaining <= 0.0)
    }

    /// 活动进度比例（0.0 ~ 1.0）
    ///
    /// 次数封顶模式按 claimed_count / claim_limit 计算，
    /// 资金池独占模式按 claimed_total / total_amount 计算。
    pub fn progress_ratio(&self) -> f64 {
        match (self.mode, self.total_policy) {
            (DistributionMode::Total, Some(TotalPolicy::All)) => match self.total_amount {
                Some(total) if total > 0.0 => self.claimed_total / total,
                _ => 0.0,
            },
            _ => match self.claim_limit {
                Some(limit) if limit > 0 => f64::from(self.claimed_count) / f64::from(limit),
                _ => 0.0,
            },
        }
    }
}
