//! REST API 请求 DTO 定义

use serde::Deserialize;
use validator::Validate;

use crate::models::{DistributionMode, TotalPolicy};
use crate::service::dto::CreateVoucherSpec;

/// 创建凭券请求
///
/// 基础字段由 validator 校验，模式相关的组合校验在服务层完成。
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoucherRequest {
    #[validate(length(min = 1, max = 32, message = "token_symbol 长度必须在 1-32 之间"))]
    pub token_symbol: String,
    pub mode: DistributionMode,
    pub total_policy: Option<TotalPolicy>,
    pub per_claim_amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub claim_limit: Option<u32>,
    #[validate(range(min = 1, message = "max_per_user 最小为 1"))]
    pub max_per_user: Option<u32>,
    pub expires_at: Option<String>,
}

impl From<CreateVoucherRequest> for CreateVoucherSpec {
    fn from(request: CreateVoucherRequest) -> Self {
        Self {
            token_symbol: request.token_symbol,
            mode: request.mode,
            total_policy: request.total_policy,
            per_claim_amount: request.per_claim_amount,
            total_amount: request.total_amount,
            claim_limit: request.claim_limit,
            max_per_user: request.max_per_user,
            expires_at: request.expires_at,
        }
    }
}

/// 领取凭券请求
///
/// voucher_ref 是原始引用载荷（链接 / 二维码内容 / 裸 token），
/// 由服务端解码为凭券 ID。
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClaimVoucherRequest {
    #[validate(length(min = 1, message = "voucher_ref 不能为空"))]
    pub voucher_ref: String,
}
