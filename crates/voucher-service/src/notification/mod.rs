//! 通知发射器
//!
//! 领取提交后面向创建者的尽力而为通知通道。与领取正确性没有任何
//! 契约：发射失败被吞掉并记录日志，绝不影响已入账的领取记录。

pub mod emitter;

pub use emitter::{MemoryEmitter, NotificationEmitter, NotificationSender, TracingEmitter};
