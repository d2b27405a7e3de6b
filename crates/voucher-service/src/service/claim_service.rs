//! 领取处理服务
//!
//! 凭券业务规则的唯一执行点。整个领取算法在存储层的一次原子更新
//! 内完成，并发领取同一凭券时不可能基于过期快照各自成功。
//!
//! ## 核心流程
//!
//! 1. 读取快照 -> 2. 状态/过期/重复领取校验 -> 3. 按模式计算发放金额
//! 4. 追加领取记录并更新计数 -> 5. 重算状态 -> 6. compare-and-put 提交
//!
//! 提交成功后才触发通知发射器（fire-and-forget），通知失败不回滚
//! 领取记录——权益一旦入账即为最终结果。

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use voucher_shared::events::VoucherClaimedEvent;

use crate::error::{Result, VoucherError};
use crate::models::{
    round_amount, ClaimRecord, DistributionMode, TotalPolicy, Voucher, VoucherStatus,
};
use crate::notification::NotificationSender;
use crate::service::dto::{ClaimAward, ClaimRequest};
use crate::store::{atomic_update, VoucherStore};

/// 原子更新内产出的提交结果
///
/// 除对外返回的发放结果外，还携带构造通知事件所需的创建者信息。
struct ClaimCommit {
    award: ClaimAward,
    creator: String,
}

/// 领取处理服务
pub struct ClaimService {
    store: Arc<dyn VoucherStore>,
    notifier: Option<Arc<NotificationSender>>,
}

impl ClaimService {
    pub fn new(store: Arc<dyn VoucherStore>) -> Self {
        Self {
            store,
            notifier: None,
        }
    }

    /// 设置通知发送器
    pub fn with_notification_sender(mut self, notifier: Arc<NotificationSender>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// 领取凭券
    ///
    /// 成功时返回发放金额与代币符号，由调用方执行实际转账（外部操作）。
    /// 失败时返回具体原因码；注意部分失败（如惰性过期）仍会落库状态变更。
    #[instrument(
        skip(self, request),
        fields(
            voucher_id = %request.voucher_id,
            claimant = %request.claimant_address
        )
    )]
    pub async fn claim(&self, request: ClaimRequest) -> Result<ClaimAward> {
        let start = Instant::now();
        let now = Utc::now();

        let outcome = atomic_update(self.store.as_ref(), &request.voucher_id, |voucher| {
            Self::apply_claim(voucher, &request, now)
        })
        .await;

        metrics::histogram!("voucher_claim_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(commit) => {
                metrics::counter!("voucher_claims_total", "result" => "granted").increment(1);
                info!(
                    amount = commit.award.amount,
                    token_symbol = %commit.award.token_symbol,
                    "领取成功"
                );

                // 通知在提交之后发送，失败只记录日志
                if let Some(notifier) = &self.notifier {
                    let event = VoucherClaimedEvent::new(
                        commit.award.voucher_id.clone(),
                        commit.creator,
                        commit.award.token_symbol.clone(),
                        commit.award.amount,
                        request.claimant_address.clone(),
                        request.claimant_identity.clone(),
                        commit.award.claimed_at,
                    );
                    let _ = notifier.notify_claimed(event);
                }

                Ok(commit.award)
            }
            Err(err) => {
                metrics::counter!("voucher_claims_total", "result" => err.error_code())
                    .increment(1);
                if err.is_business_error() {
                    info!(reason = err.error_code(), "领取被拒绝");
                } else {
                    warn!(error = %err, "领取因系统错误失败");
                }
                Err(err)
            }
        }
    }

    /// 在凭券快照上应用领取算法
    ///
    /// 在 atomic_update 闭包内执行，可能因版本冲突被重放，
    /// 必须只依赖传入的快照与请求参数。
    fn apply_claim(
        voucher: &mut Voucher,
        request: &ClaimRequest,
        now: DateTime<Utc>,
    ) -> Result<ClaimCommit> {
        // 终态凭券直接拒绝，调用方通过存储中的状态区分具体终态
        if voucher.status != VoucherStatus::Active {
            return Err(VoucherError::NotActive {
                voucher_id: voucher.id.clone(),
                status: voucher.status,
            });
        }

        // 惰性过期：首次触碰时落库状态变更，本次领取仍然失败
        if voucher.is_expired_at(now) {
            voucher.status = VoucherStatus::Expired;
            voucher.updated_at = now;
            return Err(VoucherError::Expired(voucher.id.clone()));
        }

        // 地址或身份任一命中即计入已领取次数
        let prior = voucher.count_claims_by(
            &request.claimant_address,
            request.claimant_identity.as_deref(),
        );
        if prior >= voucher.max_per_user {
            return Err(VoucherError::AlreadyClaimed {
                voucher_id: voucher.id.clone(),
                max_per_user: voucher.max_per_user,
            });
        }

        let award_amount = Self::compute_award(voucher, now)?;

        voucher.claims.push(ClaimRecord {
            claimant_address: request.claimant_address.clone(),
            claimant_identity: request.claimant_identity.clone(),
            amount: award_amount,
            claimed_at: now,
        });
        voucher.claimed_count += 1;
        voucher.claimed_total = round_amount(voucher.claimed_total + award_amount);
        if voucher.mode == DistributionMode::Total {
            let remaining = voucher.remaining_amount.unwrap_or(0.0);
            voucher.remaining_amount = Some(round_amount(remaining - award_amount));
        }

        // 本次领取触及上限则随同本次更新一起进入终态
        if voucher.has_reached_ceiling() {
            voucher.status = VoucherStatus::Exhausted;
        }
        voucher.updated_at = now;

        Ok(ClaimCommit {
            award: ClaimAward {
                voucher_id: voucher.id.clone(),
                amount: award_amount,
                token_symbol: voucher.token_symbol.clone(),
                claimed_at: now,
            },
            creator: voucher.created_by.clone(),
        })
    }

    /// 按分发模式计算本次发放金额
    ///
    /// 发现上限已满时顺带把状态置为 Exhausted（同样随本次更新落库）。
    fn compute_award(voucher: &mut Voucher, now: DateTime<Utc>) -> Result<f64> {
        match voucher.mode {
            DistributionMode::PerClaim => {
                if Self::count_ceiling_reached(voucher) {
                    voucher.status = VoucherStatus::Exhausted;
                    voucher.updated_at = now;
                    return Err(VoucherError::Exhausted(voucher.id.clone()));
                }
                let amount = voucher.per_claim_amount.unwrap_or(0.0);
                if amount <= 0.0 {
                    return Err(VoucherError::InvalidAmount(amount));
                }
                Ok(amount)
            }
            DistributionMode::Total => {
                let remaining = voucher.remaining_amount.unwrap_or(0.0);
                match voucher.total_policy {
                    Some(TotalPolicy::All) => {
                        if remaining <= 0.0 {
                            voucher.status = VoucherStatus::Exhausted;
                            voucher.updated_at = now;
                            return Err(VoucherError::Exhausted(voucher.id.clone()));
                        }
                        // 唯一依赖资金池实时状态的分支：全部剩余发给首个领取者
                        Ok(remaining)
                    }
                    _ => {
                        if Self::count_ceiling_reached(voucher) {
                            voucher.status = VoucherStatus::Exhausted;
                            voucher.updated_at = now;
                            return Err(VoucherError::Exhausted(voucher.id.clone()));
                        }
                        let amount = voucher.per_claim_amount.unwrap_or(0.0);
                        if amount <= 0.0 {
                            return Err(VoucherError::InvalidAmount(amount));
                        }
                        // 正确记账下不应触发，作为不变量防线保留
                        if remaining < amount {
                            return Err(VoucherError::InsufficientPool {
                                required: amount,
                                remaining,
                            });
                        }
                        Ok(amount)
                    }
                }
            }
        }
    }

    fn count_ceiling_reached(voucher: &Voucher) -> bool {
        voucher
            .claim_limit
            .is_some_and(|limit| voucher.claimed_count >= limit)
    }
}
