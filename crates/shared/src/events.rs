//! 事件模型
//!
//! 定义凭券系统对外发布的事件载荷。领取事件在凭券状态提交之后
//! 构造并交给通知发射器，发射器失败不回写任何业务状态。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 凭券领取事件
///
/// 每次领取成功后构造一条，面向凭券创建者投递。
/// `event_id` 使用 UUID v7，时间有序便于下游去重与排序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherClaimedEvent {
    /// 事件唯一标识（UUID v7）
    pub event_id: String,
    /// 凭券 ID
    pub voucher_id: String,
    /// 凭券创建者（事件接收方）
    pub creator: String,
    /// 发放的代币符号
    pub token_symbol: String,
    /// 本次发放金额
    pub amount: f64,
    /// 领取方地址
    pub claimant_address: String,
    /// 领取方身份标识（可选）
    pub claimant_identity: Option<String>,
    /// 领取时间
    pub claimed_at: DateTime<Utc>,
}

impl VoucherClaimedEvent {
    /// 构造领取事件
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        voucher_id: impl Into<String>,
        creator: impl Into<String>,
        token_symbol: impl Into<String>,
        amount: f64,
        claimant_address: impl Into<String>,
        claimant_identity: Option<String>,
        claimed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7().to_string(),
            voucher_id: voucher_id.into(),
            creator: creator.into(),
            token_symbol: token_symbol.into(),
            amount,
            claimant_address: claimant_address.into(),
            claimant_identity,
            claimed_at,
        }
    }
}
