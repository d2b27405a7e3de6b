//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use crate::link::VoucherRefDecoder;
use crate::service::{CampaignService, ClaimService};

/// Axum 应用共享状态
///
/// 各服务以 Arc 在 handler 间共享。
#[derive(Clone)]
pub struct AppState {
    /// 领取处理服务
    pub claim_service: Arc<ClaimService>,
    /// 活动生命周期服务
    pub campaign_service: Arc<CampaignService>,
    /// 凭券引用解码器
    pub ref_decoder: Arc<VoucherRefDecoder>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(claim_service: Arc<ClaimService>, campaign_service: Arc<CampaignService>) -> Self {
        Self {
            claim_service,
            campaign_service,
            ref_decoder: Arc::new(VoucherRefDecoder::new()),
        }
    }
}
