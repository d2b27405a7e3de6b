//! 领域模型定义

pub mod enums;
pub mod voucher;

pub use enums::{DistributionMode, TotalPolicy, VoucherStatus};
pub use voucher::{round_amount, ClaimRecord, Voucher};
