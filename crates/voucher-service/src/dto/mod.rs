//! REST API 数据传输对象

pub mod request;
pub mod response;

pub use request::{ClaimVoucherRequest, CreateVoucherRequest};
pub use response::ApiResponse;
