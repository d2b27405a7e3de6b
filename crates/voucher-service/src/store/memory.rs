//! 内存存储
//!
//! 使用 DashMap 实现的高并发内存存储，适用于测试和开发环境。
//! compare-and-put 借助 DashMap entry API 的分片锁获得单键原子性。

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use super::VoucherStore;
use crate::error::{Result, VoucherError};
use crate::models::Voucher;

/// 内存凭券存储
///
/// 数据只存活于进程内，重启即丢失。clone 共享同一底层 map。
#[derive(Debug, Default)]
pub struct MemoryVoucherStore {
    data: Arc<DashMap<String, Voucher>>,
}

impl MemoryVoucherStore {
    /// 创建新的内存存储实例
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    /// 获取凭券总数
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// 清空所有数据
    pub fn clear(&self) {
        self.data.clear();
    }
}

impl Clone for MemoryVoucherStore {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

#[async_trait]
impl VoucherStore for MemoryVoucherStore {
    async fn create(&self, voucher: Voucher) -> Result<Voucher> {
        match self.data.entry(voucher.id.clone()) {
            Entry::Occupied(_) => Err(VoucherError::AlreadyExists(voucher.id)),
            Entry::Vacant(vacant) => {
                vacant.insert(voucher.clone());
                Ok(voucher)
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Voucher>> {
        // 返回克隆，不持有分片锁
        Ok(self.data.get(id).map(|entry| entry.value().clone()))
    }

    async fn compare_and_put(&self, voucher: &Voucher) -> Result<bool> {
        match self.data.entry(voucher.id.clone()) {
            // entry 持有分片锁，版本比较与写入对同一键原子
            Entry::Occupied(mut occupied) => {
                if occupied.get().version + 1 == voucher.version {
                    occupied.insert(voucher.clone());
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            // 凭券已被删除：交由上层重新读取后以 NotFound 收尾
            Entry::Vacant(_) => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.data.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DistributionMode, VoucherStatus};
    use chrono::Utc;

    fn sample_voucher(id: &str) -> Voucher {
        let now = Utc::now();
        Voucher {
            id: id.to_string(),
            created_by: "creator-1".to_string(),
            token_symbol: "USDT".to_string(),
            mode: DistributionMode::PerClaim,
            total_policy: None,
            per_claim_amount: Some(5.0),
            total_amount: None,
            claim_limit: Some(10),
            max_per_user: 1,
            expires_at: None,
            status: VoucherStatus::Active,
            claimed_count: 0,
            claimed_total: 0.0,
            remaining_amount: None,
            claims: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryVoucherStore::new();
        let voucher = sample_voucher("VCHTEST00001");

        store.create(voucher.clone()).await.unwrap();

        let stored = store.get("VCHTEST00001").await.unwrap().unwrap();
        assert_eq!(stored, voucher);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let store = MemoryVoucherStore::new();
        store.create(sample_voucher("VCHTEST00001")).await.unwrap();

        let result = store.create(sample_voucher("VCHTEST00001")).await;
        assert!(matches!(result, Err(VoucherError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = MemoryVoucherStore::new();
        assert!(store.get("VCHMISSING01").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_compare_and_put_matching_version() {
        let store = MemoryVoucherStore::new();
        store.create(sample_voucher("VCHTEST00001")).await.unwrap();

        let mut next = sample_voucher("VCHTEST00001");
        next.claimed_count = 1;
        next.version = 2;

        assert!(store.compare_and_put(&next).await.unwrap());

        let stored = store.get("VCHTEST00001").await.unwrap().unwrap();
        assert_eq!(stored.claimed_count, 1);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_compare_and_put_stale_version_rejected() {
        let store = MemoryVoucherStore::new();
        store.create(sample_voucher("VCHTEST00001")).await.unwrap();

        // 版本跳跃（期望基线 version=2 不存在）
        let mut stale = sample_voucher("VCHTEST00001");
        stale.claimed_count = 1;
        stale.version = 3;

        assert!(!store.compare_and_put(&stale).await.unwrap());

        // 存储内容未被修改
        let stored = store.get("VCHTEST00001").await.unwrap().unwrap();
        assert_eq!(stored.claimed_count, 0);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_compare_and_put_on_deleted_voucher() {
        let store = MemoryVoucherStore::new();

        let mut voucher = sample_voucher("VCHTEST00001");
        voucher.version = 2;
        assert!(!store.compare_and_put(&voucher).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryVoucherStore::new();
        store.create(sample_voucher("VCHTEST00001")).await.unwrap();

        assert!(store.delete("VCHTEST00001").await.unwrap());
        assert!(store.get("VCHTEST00001").await.unwrap().is_none());
        // 重复删除返回 false
        assert!(!store.delete("VCHTEST00001").await.unwrap());
    }
}
