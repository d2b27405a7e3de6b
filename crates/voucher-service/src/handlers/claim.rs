//! 领取 API 处理器

use std::time::Duration;

use axum::extract::State;
use axum::Json;
use validator::Validate;
use voucher_shared::retry::{retry_with_policy, RetryPolicy};

use crate::dto::{ApiResponse, ClaimVoucherRequest};
use crate::error::VoucherError;
use crate::handlers::CallerIdentity;
use crate::service::dto::{ClaimAward, ClaimRequest};
use crate::state::AppState;

/// 领取接口的重试策略
///
/// 仅对可重试错误（乐观冲突 / 存储瞬时故障）生效，退避间隔
/// 保持在交互可接受的量级。业务拒绝不重试。
fn claim_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(1),
        multiplier: 2.0,
    }
}

/// 领取凭券
///
/// POST /api/claims
///
/// 请求体携带原始凭券引用（链接 / 二维码内容 / 裸 token），
/// 先解码为凭券 ID 再进入领取流程。成功响应返回发放金额与
/// 代币符号，实际转账由下游结算系统完成。
pub async fn claim_voucher(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(request): Json<ClaimVoucherRequest>,
) -> Result<Json<ApiResponse<ClaimAward>>, VoucherError> {
    request.validate()?;

    let voucher_id = state
        .ref_decoder
        .decode(&request.voucher_ref)
        .ok_or_else(|| VoucherError::Validation("无法识别的凭券引用".to_string()))?;

    let claim_request =
        ClaimRequest::new(voucher_id, caller.claimant_address()).with_identity(caller.user_id);

    let award = retry_with_policy(
        &claim_retry_policy(),
        "claim_voucher",
        VoucherError::is_retryable,
        || state.claim_service.claim(claim_request.clone()),
    )
    .await?;

    Ok(Json(ApiResponse::success(award)))
}
