//! 凭券存储层
//!
//! 提供凭券文档的点读、创建、删除与乐观并发控制下的原子更新。
//! 存储层只负责版本一致性，不做任何业务校验。
//!
//! ## 并发模型
//!
//! 每个凭券文档携带版本号。写入采用 compare-and-put：仅当存储中的
//! 版本等于待写文档版本减一时才提交，否则视为并发冲突。`atomic_update`
//! 在冲突时重新读取最新快照并重放业务闭包，有界重试后向调用方返回
//! `Conflict`。同一凭券上的成功更新因此构成严格串行序列。

mod memory;
mod postgres;

pub use memory::MemoryVoucherStore;
pub use postgres::PgVoucherStore;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, VoucherError};
use crate::models::Voucher;

/// 原子更新的最大尝试次数（含首次）
///
/// 内存存储的冲突窗口极短，PostgreSQL 场景冲突率取决于单券竞争度。
/// 用尽后返回 Conflict，由调用方按退避策略重试。
pub const MAX_UPDATE_ATTEMPTS: u32 = 8;

/// 凭券存储接口
///
/// 两个实现：内存版（开发/测试）与 PostgreSQL 版（生产）。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoucherStore: Send + Sync {
    /// 创建凭券
    ///
    /// id 冲突时返回 AlreadyExists（随机 ID 下实际不可达）。
    async fn create(&self, voucher: Voucher) -> Result<Voucher>;

    /// 点读凭券，永不阻塞
    async fn get(&self, id: &str) -> Result<Option<Voucher>>;

    /// 带版本比较的写入
    ///
    /// 仅当存储中的版本等于 `voucher.version - 1` 时提交并返回 true；
    /// 版本不匹配或凭券已被删除时返回 false，不做任何修改。
    async fn compare_and_put(&self, voucher: &Voucher) -> Result<bool>;

    /// 删除凭券，返回是否存在
    ///
    /// 无条件点删除。业务上仅允许删除已取消的凭券，
    /// 状态校验由生命周期服务在删除前完成。
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// 乐观并发控制下的原子更新
///
/// 读取最新快照 -> 在副本上执行业务闭包 -> compare-and-put 提交。
/// 版本冲突时重新读取并重放闭包，因此闭包可能被执行多次，
/// 必须只依赖传入的凭券状态，不得有外部副作用。
///
/// 闭包返回业务错误时，若它对凭券做了修改（如惰性过期落库），
/// 修改仍会被提交——调用方不能假设"失败意味着无状态变更"。
pub async fn atomic_update<T, F>(
    store: &dyn VoucherStore,
    voucher_id: &str,
    mut apply: F,
) -> Result<T>
where
    F: FnMut(&mut Voucher) -> Result<T>,
{
    for attempt in 0..MAX_UPDATE_ATTEMPTS {
        let Some(snapshot) = store.get(voucher_id).await? else {
            return Err(VoucherError::NotFound(voucher_id.to_string()));
        };

        let mut next = snapshot.clone();
        let outcome = apply(&mut next);

        // 闭包未修改凭券时无需写入，直接返回业务结果
        if next == snapshot {
            return outcome;
        }

        next.version = snapshot.version + 1;
        if store.compare_and_put(&next).await? {
            return outcome;
        }

        // 版本冲突：其他领取已先行提交，重新读取最新快照再重放
        metrics::counter!("voucher_store_conflicts_total").increment(1);
        debug!(
            voucher_id = %voucher_id,
            attempt,
            "原子更新遇到版本冲突，重新读取后重试"
        );
    }

    Err(VoucherError::Conflict)
}
