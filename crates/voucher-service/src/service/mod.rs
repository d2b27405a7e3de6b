//! 业务服务层
//!
//! - `claim_service`: 领取处理器，所有领取规则的唯一执行点
//! - `campaign_service`: 活动生命周期管理（创建 / 结束 / 删除 / 查询）

pub mod campaign_service;
pub mod claim_service;
pub mod dto;

pub use campaign_service::CampaignService;
pub use claim_service::ClaimService;
pub use dto::{ClaimAward, ClaimRequest, CreateVoucherSpec, VoucherPublicView};
