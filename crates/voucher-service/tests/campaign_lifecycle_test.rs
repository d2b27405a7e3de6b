//! 活动生命周期集成测试
//!
//! 覆盖创建校验、过期时间归一化、结束规则边界与删除守卫。

use std::sync::Arc;

use voucher_service::error::VoucherError;
use voucher_service::models::{TotalPolicy, VoucherStatus};
use voucher_service::service::dto::{ClaimRequest, CreateVoucherSpec};
use voucher_service::service::{CampaignService, ClaimService};
use voucher_service::store::MemoryVoucherStore;

// ==================== 辅助函数 ====================

const CREATOR: &str = "creator-1";
const STRANGER: &str = "someone-else";

struct TestEnv {
    claim_service: ClaimService,
    campaign_service: CampaignService,
}

fn setup() -> TestEnv {
    let store = Arc::new(MemoryVoucherStore::new());
    TestEnv {
        claim_service: ClaimService::new(store.clone()),
        campaign_service: CampaignService::new(store),
    }
}

/// 创建 claim_limit=10 的凭券并完成指定笔数的领取
async fn voucher_with_claims(env: &TestEnv, claimed: usize) -> String {
    let id = env
        .campaign_service
        .create_voucher(CreateVoucherSpec::per_claim("USDT", 1.0, 10), CREATOR)
        .await
        .unwrap()
        .id;

    for i in 0..claimed {
        env.claim_service
            .claim(ClaimRequest::new(&id, format!("0xaddr{i:04}")))
            .await
            .unwrap();
    }

    id
}

// ==================== 创建 ====================

#[tokio::test]
async fn test_create_per_claim_voucher() {
    let env = setup();
    let voucher = env
        .campaign_service
        .create_voucher(
            CreateVoucherSpec::per_claim("USDT", 5.0, 10).with_max_per_user(2),
            CREATOR,
        )
        .await
        .unwrap();

    assert_eq!(voucher.created_by, CREATOR);
    assert_eq!(voucher.status, VoucherStatus::Active);
    assert_eq!(voucher.max_per_user, 2);
    assert_eq!(voucher.claimed_count, 0);
    assert!(voucher.claims.is_empty());
    // 对外契约：至少 8 位字母数字
    assert!(voucher.id.len() >= 8);
    assert!(voucher.id.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_create_defaults_max_per_user_to_one() {
    let env = setup();
    let voucher = env
        .campaign_service
        .create_voucher(CreateVoucherSpec::per_claim("USDT", 5.0, 10), CREATOR)
        .await
        .unwrap();

    assert_eq!(voucher.max_per_user, 1);
}

#[tokio::test]
async fn test_create_total_equal_precomputes_split() {
    let env = setup();
    let voucher = env
        .campaign_service
        .create_voucher(CreateVoucherSpec::total_equal("OP", 100.0, 4), CREATOR)
        .await
        .unwrap();

    assert_eq!(voucher.per_claim_amount, Some(25.0));
    assert_eq!(voucher.remaining_amount, Some(100.0));
    assert_eq!(voucher.total_policy, Some(TotalPolicy::Equal));
}

#[tokio::test]
async fn test_create_total_all_has_no_claim_limit() {
    let env = setup();
    let voucher = env
        .campaign_service
        .create_voucher(CreateVoucherSpec::total_all("OP", 57.5), CREATOR)
        .await
        .unwrap();

    assert!(voucher.claim_limit.is_none());
    assert_eq!(voucher.remaining_amount, Some(57.5));
    // All 策略隐含领取上限 1
    assert_eq!(voucher.claim_ceiling(), Some(1));
}

#[tokio::test]
async fn test_create_rejects_missing_mode_fields() {
    let env = setup();

    let mut spec = CreateVoucherSpec::per_claim("USDT", 5.0, 10);
    spec.claim_limit = None;
    assert!(matches!(
        env.campaign_service.create_voucher(spec, CREATOR).await,
        Err(VoucherError::Validation(_))
    ));

    let mut spec = CreateVoucherSpec::total_equal("OP", 100.0, 4);
    spec.total_policy = None;
    assert!(matches!(
        env.campaign_service.create_voucher(spec, CREATOR).await,
        Err(VoucherError::Validation(_))
    ));
}

#[tokio::test]
async fn test_create_accepts_multiple_expiry_shapes() {
    let env = setup();

    for literal in [
        "2099-12-31T23:59:59Z",
        "2099-12-31 12:00:00",
        "2099-12-31",
    ] {
        let voucher = env
            .campaign_service
            .create_voucher(
                CreateVoucherSpec::per_claim("USDT", 5.0, 10).with_expires_at(literal),
                CREATOR,
            )
            .await
            .unwrap_or_else(|e| panic!("字面量 {literal} 应被接受: {e}"));
        assert!(voucher.expires_at.is_some());
    }
}

#[tokio::test]
async fn test_create_rejects_unparseable_expiry() {
    let env = setup();

    // 不可解析的过期时间是创建期硬性错误，不会静默当作「永不过期」
    let result = env
        .campaign_service
        .create_voucher(
            CreateVoucherSpec::per_claim("USDT", 5.0, 10).with_expires_at("下周五"),
            CREATOR,
        )
        .await;

    assert!(matches!(result, Err(VoucherError::Validation(_))));
}

// ==================== 查询 ====================

#[tokio::test]
async fn test_get_voucher_public_view() {
    let env = setup();
    let id = voucher_with_claims(&env, 5).await;

    let view = env.campaign_service.get_voucher(&id).await.unwrap();
    assert_eq!(view.claimed_count, 5);
    assert_eq!(view.progress, 0.5);
    assert_eq!(view.status, VoucherStatus::Active);
}

#[tokio::test]
async fn test_get_missing_voucher() {
    let env = setup();
    let result = env.campaign_service.get_voucher("VCHMISSING99").await;
    assert!(matches!(result, Err(VoucherError::NotFound(_))));
}

// ==================== 结束规则 ====================

#[tokio::test]
async fn test_end_with_zero_progress() {
    let env = setup();
    let id = voucher_with_claims(&env, 0).await;

    env.campaign_service.end_voucher(&id, CREATOR).await.unwrap();

    let view = env.campaign_service.get_voucher(&id).await.unwrap();
    assert_eq!(view.status, VoucherStatus::Cancelled);

    // 取消后不可再领取
    let result = env
        .claim_service
        .claim(ClaimRequest::new(&id, "0xlate"))
        .await;
    assert!(matches!(
        result,
        Err(VoucherError::NotActive {
            status: VoucherStatus::Cancelled,
            ..
        })
    ));
}

#[tokio::test]
async fn test_end_rejected_at_mid_progress() {
    let env = setup();
    // 50% 进度：既不是零领取也未到尾部清理阈值
    let id = voucher_with_claims(&env, 5).await;

    let result = env.campaign_service.end_voucher(&id, CREATOR).await;
    assert!(matches!(
        result,
        Err(VoucherError::CannotEnd { progress }) if (progress - 0.5).abs() < f64::EPSILON
    ));

    // 状态未被改变
    let view = env.campaign_service.get_voucher(&id).await.unwrap();
    assert_eq!(view.status, VoucherStatus::Active);
}

#[tokio::test]
async fn test_end_allowed_at_eighty_percent() {
    let env = setup();
    let id = voucher_with_claims(&env, 8).await;

    env.campaign_service.end_voucher(&id, CREATOR).await.unwrap();

    let view = env.campaign_service.get_voucher(&id).await.unwrap();
    assert_eq!(view.status, VoucherStatus::Cancelled);
}

#[tokio::test]
async fn test_end_requires_creator() {
    let env = setup();
    let id = voucher_with_claims(&env, 0).await;

    let result = env.campaign_service.end_voucher(&id, STRANGER).await;
    assert!(matches!(result, Err(VoucherError::Forbidden { .. })));
}

#[tokio::test]
async fn test_end_rejects_non_active_voucher() {
    let env = setup();
    let id = voucher_with_claims(&env, 0).await;
    env.campaign_service.end_voucher(&id, CREATOR).await.unwrap();

    // 已取消的凭券不能再次结束
    let result = env.campaign_service.end_voucher(&id, CREATOR).await;
    assert!(matches!(result, Err(VoucherError::NotActive { .. })));
}

// ==================== 删除守卫 ====================

#[tokio::test]
async fn test_delete_rejects_active_voucher() {
    let env = setup();
    let id = voucher_with_claims(&env, 0).await;

    let result = env.campaign_service.delete_voucher(&id, CREATOR).await;
    assert!(matches!(result, Err(VoucherError::NotCancelled(_))));
}

#[tokio::test]
async fn test_delete_requires_creator_even_when_cancelled() {
    let env = setup();
    let id = voucher_with_claims(&env, 0).await;
    env.campaign_service.end_voucher(&id, CREATOR).await.unwrap();

    let result = env.campaign_service.delete_voucher(&id, STRANGER).await;
    assert!(matches!(result, Err(VoucherError::Forbidden { .. })));
}

#[tokio::test]
async fn test_delete_cancelled_voucher() {
    let env = setup();
    let id = voucher_with_claims(&env, 0).await;
    env.campaign_service.end_voucher(&id, CREATOR).await.unwrap();

    env.campaign_service
        .delete_voucher(&id, CREATOR)
        .await
        .unwrap();

    // 删除后彻底不可见
    let result = env.campaign_service.get_voucher(&id).await;
    assert!(matches!(result, Err(VoucherError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_missing_voucher() {
    let env = setup();
    let result = env
        .campaign_service
        .delete_voucher("VCHMISSING99", CREATOR)
        .await;
    assert!(matches!(result, Err(VoucherError::NotFound(_))));
}
