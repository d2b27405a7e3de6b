//! 凭券管理 API 处理器
//!
//! 实现凭券的创建、查询与生命周期操作。

use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use crate::dto::{ApiResponse, CreateVoucherRequest};
use crate::error::VoucherError;
use crate::handlers::CallerIdentity;
use crate::service::dto::{CreateVoucherSpec, VoucherPublicView};
use crate::state::AppState;

/// 创建凭券
///
/// POST /api/vouchers
pub async fn create_voucher(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(request): Json<CreateVoucherRequest>,
) -> Result<Json<ApiResponse<VoucherPublicView>>, VoucherError> {
    request.validate()?;

    let spec = CreateVoucherSpec::from(request);
    let voucher = state
        .campaign_service
        .create_voucher(spec, &caller.user_id)
        .await?;

    Ok(Json(ApiResponse::success(VoucherPublicView::from(&voucher))))
}

/// 查询凭券对外视图
///
/// GET /api/vouchers/{id}
pub async fn get_voucher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VoucherPublicView>>, VoucherError> {
    let view = state.campaign_service.get_voucher(&id).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// 结束活动
///
/// POST /api/vouchers/{id}/end
pub async fn end_voucher(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, VoucherError> {
    state
        .campaign_service
        .end_voucher(&id, &caller.user_id)
        .await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}

/// 删除已取消的凭券
///
/// DELETE /api/vouchers/{id}
pub async fn delete_voucher(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, VoucherError> {
    state
        .campaign_service
        .delete_voucher(&id, &caller.user_id)
        .await?;
    Ok(Json(ApiResponse::<()>::success_empty()))
}
