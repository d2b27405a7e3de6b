//! 通知发射器实现
//!
//! `NotificationEmitter` 是显式的观察者抽象：领取事件以完整载荷
//! 传入，取代模块级全局监听列表那类隐式副作用。发射器只会在
//! 领取的原子更新提交之后被调用。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use voucher_shared::events::VoucherClaimedEvent;

use crate::error::{Result, VoucherError};

/// 通知发射器接口
#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    /// 发射器名称（用于日志）
    fn name(&self) -> &'static str;

    /// 发射领取事件
    async fn emit(&self, event: &VoucherClaimedEvent) -> Result<()>;
}

/// 日志发射器
///
/// 默认实现：把领取事件以结构化日志输出。生产环境可替换为
/// 推送 / 消息队列等实现，接口不变。
#[derive(Debug, Default)]
pub struct TracingEmitter;

impl TracingEmitter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationEmitter for TracingEmitter {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn emit(&self, event: &VoucherClaimedEvent) -> Result<()> {
        info!(
            event_id = %event.event_id,
            voucher_id = %event.voucher_id,
            creator = %event.creator,
            claimant = %event.claimant_address,
            amount = event.amount,
            token_symbol = %event.token_symbol,
            "凭券领取通知"
        );
        Ok(())
    }
}

/// 内存发射器
///
/// 收集所有事件供测试断言。
#[derive(Debug, Default, Clone)]
pub struct MemoryEmitter {
    events: Arc<Mutex<Vec<VoucherClaimedEvent>>>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已收集事件的快照
    pub fn events(&self) -> Vec<VoucherClaimedEvent> {
        self.events.lock().expect("emitter lock poisoned").clone()
    }
}

#[async_trait]
impl NotificationEmitter for MemoryEmitter {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn emit(&self, event: &VoucherClaimedEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| VoucherError::Internal("emitter lock poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}

/// 通知发送器
///
/// 在后台任务中调用发射器（fire-and-forget），不阻塞领取路径。
/// 返回 JoinHandle 便于测试等待投递完成，生产调用方直接忽略。
pub struct NotificationSender {
    emitter: Arc<dyn NotificationEmitter>,
}

impl NotificationSender {
    pub fn new(emitter: Arc<dyn NotificationEmitter>) -> Self {
        Self { emitter }
    }

    /// 异步发送领取通知
    ///
    /// 发送失败只记录日志并计入指标，不向调用方传播。
    pub fn notify_claimed(&self, event: VoucherClaimedEvent) -> JoinHandle<()> {
        let emitter = self.emitter.clone();

        tokio::spawn(async move {
            match emitter.emit(&event).await {
                Ok(()) => {
                    metrics::counter!("voucher_notifications_total", "result" => "sent")
                        .increment(1);
                }
                Err(err) => {
                    metrics::counter!("voucher_notifications_total", "result" => "failed")
                        .increment(1);
                    warn!(
                        emitter = emitter.name(),
                        event_id = %event.event_id,
                        voucher_id = %event.voucher_id,
                        error = %err,
                        "领取通知发送失败"
                    );
                }
            }
        })
    }
}
