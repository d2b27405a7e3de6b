//! PostgreSQL 存储
//!
//! 每张凭券一行，文档整体以 JSONB 存储，另设独立的 version 列承载
//! 乐观并发控制。compare-and-put 通过
//! `UPDATE ... WHERE id = $1 AND version = $2` 的受影响行数判定提交结果，
//! 不依赖行级锁，冲突由上层驱动器重试。

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::VoucherStore;
use crate::error::{Result, VoucherError};
use crate::models::Voucher;

/// PostgreSQL 凭券存储
#[derive(Debug, Clone)]
pub struct PgVoucherStore {
    pool: PgPool,
}

impl PgVoucherStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 初始化表结构（幂等）
    ///
    /// 服务启动时调用，避免部署时单独的迁移步骤。
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vouchers (
                id         TEXT PRIMARY KEY,
                doc        JSONB NOT NULL,
                version    BIGINT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("凭券表结构已就绪");
        Ok(())
    }

    fn encode(voucher: &Voucher) -> Result<serde_json::Value> {
        serde_json::to_value(voucher).map_err(Into::into)
    }

    fn decode(doc: serde_json::Value) -> Result<Voucher> {
        serde_json::from_value(doc)
            .map_err(|e| VoucherError::Internal(format!("凭券文档反序列化失败: {e}")))
    }
}

#[async_trait]
impl VoucherStore for PgVoucherStore {
    async fn create(&self, voucher: Voucher) -> Result<Voucher> {
        let doc = Self::encode(&voucher)?;

        let result = sqlx::query(
            r#"
            INSERT INTO vouchers (id, doc, version, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&voucher.id)
        .bind(&doc)
        .bind(voucher.version as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(VoucherError::AlreadyExists(voucher.id));
        }

        Ok(voucher)
    }

    async fn get(&self, id: &str) -> Result<Option<Voucher>> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM vouchers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        doc.map(Self::decode).transpose()
    }

    async fn compare_and_put(&self, voucher: &Voucher) -> Result<bool> {
        let doc = Self::encode(voucher)?;

        // 版本比较与写入在单条 UPDATE 中完成，数据库保证其原子性
        let result = sqlx::query(
            r#"
            UPDATE vouchers
            SET doc = $2, version = $3, updated_at = NOW()
            WHERE id = $1 AND version = $3 - 1
            "#,
        )
        .bind(&voucher.id)
        .bind(&doc)
        .bind(voucher.version as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vouchers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
