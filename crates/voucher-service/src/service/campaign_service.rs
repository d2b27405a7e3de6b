//! 活动生命周期服务
//!
//! 凭券的创建、结束、删除与查询，管理操作全部要求请求方与创建者匹配
//! （所有权校验，非角色权限）。结束操作与领取共用同一存储的原子更新，
//! 结束请求与最后一笔领取竞争时不会破坏状态。

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use tracing::{info, instrument};

use crate::error::{Result, VoucherError};
use crate::models::{
    round_amount, DistributionMode, TotalPolicy, Voucher, VoucherStatus,
};
use crate::service::dto::{CreateVoucherSpec, VoucherPublicView};
use crate::store::{atomic_update, VoucherStore};

/// 凭券 ID 长度
///
/// 随机字母数字串，满足对外契约的「至少 8 位字母数字」。
const VOUCHER_ID_LEN: usize = 12;

/// 允许提前结束活动的最低进度
///
/// 进度为 0（尚无领取）或不低于该阈值时才允许取消：
/// 防止创建者在活动中途取消，让少数未领取者落空；
/// 同时保留早期放弃（零领取）和尾部清理（基本完成）两个出口。
pub const MIN_END_PROGRESS: f64 = 0.8;

/// 活动生命周期服务
pub struct CampaignService {
    store: Arc<dyn VoucherStore>,
}

impl CampaignService {
    pub fn new(store: Arc<dyn VoucherStore>) -> Self {
        Self { store }
    }

    /// 创建凭券
    ///
    /// 校验模式相关的必填字段，归一化过期时间，Total/Equal 模式
    /// 预计算单笔均分金额（6 位小数）。
    #[instrument(skip(self, spec), fields(creator = %creator, mode = %spec.mode))]
    pub async fn create_voucher(
        &self,
        spec: CreateVoucherSpec,
        creator: &str,
    ) -> Result<Voucher> {
        Self::validate_spec(&spec)?;

        let expires_at = spec
            .expires_at
            .as_deref()
            .map(Self::parse_expiry)
            .transpose()?;

        let max_per_user = spec.max_per_user.unwrap_or(1);

        // 模式相关的金额初始化
        let (per_claim_amount, remaining_amount) = match spec.mode {
            DistributionMode::PerClaim => (spec.per_claim_amount, None),
            DistributionMode::Total => {
                let total = spec.total_amount.unwrap_or(0.0);
                let per_claim = match spec.total_policy {
                    Some(TotalPolicy::Equal) => {
                        // 资金池按人数均分，创建时一次性定价
                        let limit = spec.claim_limit.unwrap_or(0);
                        Some(round_amount(total / f64::from(limit)))
                    }
                    _ => None,
                };
                (per_claim, Some(total))
            }
        };

        let now = Utc::now();
        let voucher = Voucher {
            id: Self::generate_voucher_id(),
            created_by: creator.to_string(),
            token_symbol: spec.token_symbol.trim().to_string(),
            mode: spec.mode,
            total_policy: match spec.mode {
                DistributionMode::Total => spec.total_policy,
                DistributionMode::PerClaim => None,
            },
            per_claim_amount,
            total_amount: match spec.mode {
                DistributionMode::Total => spec.total_amount,
                DistributionMode::PerClaim => None,
            },
            claim_limit: match (spec.mode, spec.total_policy) {
                (DistributionMode::Total, Some(TotalPolicy::All)) => None,
                _ => spec.claim_limit,
            },
            max_per_user,
            expires_at,
            status: VoucherStatus::Active,
            claimed_count: 0,
            claimed_total: 0.0,
            remaining_amount,
            claims: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.create(voucher).await?;

        metrics::counter!("voucher_campaigns_total", "operation" => "create").increment(1);
        info!(
            voucher_id = %created.id,
            token_symbol = %created.token_symbol,
            "凭券已创建"
        );

        Ok(created)
    }

    /// 查询凭券对外视图
    pub async fn get_voucher(&self, voucher_id: &str) -> Result<VoucherPublicView> {
        let voucher = self
            .store
            .get(voucher_id)
            .await?
            .ok_or_else(|| VoucherError::NotFound(voucher_id.to_string()))?;

        Ok(VoucherPublicView::from(&voucher))
    }

    /// 结束（取消）活动
    ///
    /// 仅创建者可操作；进度必须为 0 或不低于 MIN_END_PROGRESS。
    /// 在原子更新内执行，与并发领取竞争安全。
    #[instrument(skip(self), fields(voucher_id = %voucher_id, requester = %requester))]
    pub async fn end_voucher(&self, voucher_id: &str, requester: &str) -> Result<()> {
        let now = Utc::now();
        let requester = requester.to_string();

        atomic_update(self.store.as_ref(), voucher_id, |voucher| {
            if voucher.created_by != requester {
                return Err(VoucherError::Forbidden {
                    operation: "end_voucher".to_string(),
                });
            }
            if voucher.status != VoucherStatus::Active {
                return Err(VoucherError::NotActive {
                    voucher_id: voucher.id.clone(),
                    status: voucher.status,
                });
            }

            let progress = voucher.progress_ratio();
            if progress > 0.0 && progress < MIN_END_PROGRESS {
                return Err(VoucherError::CannotEnd { progress });
            }

            voucher.status = VoucherStatus::Cancelled;
            voucher.updated_at = now;
            Ok(())
        })
        .await?;

        metrics::counter!("voucher_campaigns_total", "operation" => "end").increment(1);
        info!("活动已结束");
        Ok(())
    }

    /// 删除已取消的凭券
    ///
    /// 仅创建者可操作，且凭券必须处于 Cancelled 状态。已取消的凭券
    /// 不会再被领取修改，因此无需原子更新；删除前重读一次状态，
    /// 避免校验与删除之间凭券被并发替换。
    #[instrument(skip(self), fields(voucher_id = %voucher_id, requester = %requester))]
    pub async fn delete_voucher(&self, voucher_id: &str, requester: &str) -> Result<()> {
        let voucher = self
            .store
            .get(voucher_id)
            .await?
            .ok_or_else(|| VoucherError::NotFound(voucher_id.to_string()))?;

        if voucher.created_by != requester {
            return Err(VoucherError::Forbidden {
                operation: "delete_voucher".to_string(),
            });
        }
        if voucher.status != VoucherStatus::Cancelled {
            return Err(VoucherError::NotCancelled(voucher_id.to_string()));
        }

        // 删除前重读状态
        let Some(current) = self.store.get(voucher_id).await? else {
            return Err(VoucherError::NotFound(voucher_id.to_string()));
        };
        if current.status != VoucherStatus::Cancelled {
            return Err(VoucherError::NotCancelled(voucher_id.to_string()));
        }

        self.store.delete(voucher_id).await?;

        metrics::counter!("voucher_campaigns_total", "operation" => "delete").increment(1);
        info!("凭券已删除");
        Ok(())
    }

    /// 校验创建参数
    fn validate_spec(spec: &CreateVoucherSpec) -> Result<()> {
        if spec.token_symbol.trim().is_empty() {
            return Err(VoucherError::Validation("token_symbol 不能为空".to_string()));
        }
        if let Some(max_per_user) = spec.max_per_user
            && max_per_user < 1
        {
            return Err(VoucherError::Validation(
                "max_per_user 最小为 1".to_string(),
            ));
        }

        match spec.mode {
            DistributionMode::PerClaim => {
                let amount = spec.per_claim_amount.ok_or_else(|| {
                    VoucherError::Validation("PerClaim 模式必须提供 per_claim_amount".to_string())
                })?;
                if amount <= 0.0 {
                    return Err(VoucherError::Validation(
                        "per_claim_amount 必须大于 0".to_string(),
                    ));
                }
                let limit = spec.claim_limit.ok_or_else(|| {
                    VoucherError::Validation("PerClaim 模式必须提供 claim_limit".to_string())
                })?;
                if limit < 1 {
                    return Err(VoucherError::Validation(
                        "claim_limit 最小为 1".to_string(),
                    ));
                }
            }
            DistributionMode::Total => {
                let total = spec.total_amount.ok_or_else(|| {
                    VoucherError::Validation("Total 模式必须提供 total_amount".to_string())
                })?;
                if total <= 0.0 {
                    return Err(VoucherError::Validation(
                        "total_amount 必须大于 0".to_string(),
                    ));
                }
                let policy = spec.total_policy.ok_or_else(|| {
                    VoucherError::Validation("Total 模式必须提供 total_policy".to_string())
                })?;
                if policy == TotalPolicy::Equal {
                    let limit = spec.claim_limit.ok_or_else(|| {
                        VoucherError::Validation(
                            "Total/Equal 模式必须提供 claim_limit".to_string(),
                        )
                    })?;
                    if limit < 1 {
                        return Err(VoucherError::Validation(
                            "claim_limit 最小为 1".to_string(),
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// 解析过期时间字面量
    ///
    /// 接受的格式：
    /// - RFC 3339（如 `2026-12-31T23:59:59Z`）
    /// - `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`（按 UTC 解释）
    /// - `YYYY-MM-DD`（按当天 23:59:59 UTC 处理，凭券在该日期当天仍可领取）
    ///
    /// 无法解析的输入是创建期的硬性校验错误，不会静默回退为「永不过期」。
    fn parse_expiry(input: &str) -> Result<DateTime<Utc>> {
        let trimmed = input.trim();

        if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(parsed.with_timezone(&Utc));
        }

        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            let end_of_day = date
                .and_hms_opt(23, 59, 59)
                .expect("23:59:59 is a valid time of day");
            return Ok(Utc.from_utc_datetime(&end_of_day));
        }

        Err(VoucherError::Validation(format!(
            "无法解析过期时间: {trimmed}"
        )))
    }

    /// 生成随机凭券 ID
    fn generate_voucher_id() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(VOUCHER_ID_LEN)
            .map(char::from)
            .collect()
    }
}
