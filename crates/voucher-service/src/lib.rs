//! 凭券分发服务
//!
//! 管理可分享凭券（扫码/链接领取）的创建、领取与生命周期，
//! 在并发领取压力下保证不超发、不重复领取、状态一致。
//!
//! ## 核心功能
//!
//! - **凭券存储**：带版本号的凭券文档存储，乐观并发控制下的原子更新
//! - **领取处理**：所有业务规则在单次原子更新内执行，并发领取可线性化
//! - **活动生命周期**：创建、按进度规则结束、删除已取消的凭券（仅限创建者）
//! - **领取通知**：领取提交后尽力而为地通知创建者，失败不影响领取结果
//! - **凭券引用解析**：从链接/二维码载荷中提取凭券 ID
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `store`: 凭券存储层（内存 / PostgreSQL）
//! - `service`: 业务服务层
//! - `notification`: 通知发射器
//! - `link`: 凭券引用解析
//! - `handlers` / `routes` / `state` / `dto`: REST API 层

pub mod dto;
pub mod error;
pub mod handlers;
pub mod link;
pub mod models;
pub mod notification;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use error::{Result, VoucherError};
pub use link::VoucherRefDecoder;
pub use models::*;
pub use notification::{MemoryEmitter, NotificationEmitter, NotificationSender, TracingEmitter};
pub use service::{
    CampaignService, ClaimAward, ClaimRequest, ClaimService, CreateVoucherSpec, VoucherPublicView,
};
pub use store::{atomic_update, MemoryVoucherStore, PgVoucherStore, VoucherStore};
