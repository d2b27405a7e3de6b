//! 枚举类型定义
//!
//! 包含凭券状态、分发模式、资金池策略等枚举。

use serde::{Deserialize, Serialize};

/// 凭券状态
///
/// 状态迁移是单向的：Active 只能进入三个终态之一，终态之间不互相转换。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherStatus {
    /// 进行中 - 可正常领取
    #[default]
    Active,
    /// 已领完 - 达到领取上限或资金池耗尽
    Exhausted,
    /// 已过期 - 超过有效期（首次领取触碰时惰性落库）
    Expired,
    /// 已取消 - 创建者主动结束
    Cancelled,
}

impl VoucherStatus {
    /// 是否为终态
    ///
    /// 终态凭券不再接受任何领取，状态也不会再变化。
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Expired | Self::Cancelled)
    }
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 序列化为 SCREAMING_SNAKE_CASE 保持与 serde 的一致性，
        // 便于在日志和 API 响应中统一引用
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Exhausted => "EXHAUSTED",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// 分发模式
///
/// 创建后不可变更。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistributionMode {
    /// 固定单笔金额，按领取人数封顶
    PerClaim,
    /// 共享资金池，按 TotalPolicy 细分发放方式
    Total,
}

impl std::fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PerClaim => "PER_CLAIM",
            Self::Total => "TOTAL",
        };
        write!(f, "{s}")
    }
}

/// 资金池策略（仅 Total 模式）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TotalPolicy {
    /// 资金池按固定人数均分，恰好 claim_limit 次领取可成功
    Equal,
    /// 整个剩余资金池发给第一个成功领取者，随即耗尽
    All,
}

impl std::fmt::Display for TotalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Equal => "EQUAL",
            Self::All => "ALL",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_terminal() {
        assert!(!VoucherStatus::Active.is_terminal());
        assert!(VoucherStatus::Exhausted.is_terminal());
        assert!(VoucherStatus::Expired.is_terminal());
        assert!(VoucherStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_display_matches_serde() {
        let json = serde_json::to_string(&VoucherStatus::Exhausted).unwrap();
        assert_eq!(json, format!("\"{}\"", VoucherStatus::Exhausted));
    }

    #[test]
    fn test_mode_serde_round_trip() {
        let mode: DistributionMode = serde_json::from_str("\"PER_CLAIM\"").unwrap();
        assert_eq!(mode, DistributionMode::PerClaim);

        let policy: TotalPolicy = serde_json::from_str("\"ALL\"").unwrap();
        assert_eq!(policy, TotalPolicy::All);
    }
}
