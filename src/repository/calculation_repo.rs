// ==========================================
// 报价成本核算系统 - 核算单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 存储方案: calculation_document 表按报价请求 id 为主键,
// 核算单整体以 JSON payload 存储, 保存即全量替换（最后写入生效）。
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::calculation::CalculationDocument;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// CalculationRepository - 核算单仓储
// ==========================================
/// 核算单仓储
/// 职责: calculation_document 表的 load / upsert / delete
pub struct CalculationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CalculationRepository {
    /// 创建新的 CalculationRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按报价请求 id 加载最近保存的核算单
    ///
    /// # 返回
    /// - Ok(Some(CalculationDocument)): 存在保存记录
    /// - Ok(None): 该请求尚未保存过核算单
    pub fn load(&self, quotation_request_id: &str) -> RepositoryResult<Option<CalculationDocument>> {
        let conn = self.get_conn()?;

        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM calculation_document WHERE quotation_request_id = ?1",
                params![quotation_request_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => {
                let doc: CalculationDocument = serde_json::from_str(&json)?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// 保存核算单（INSERT OR REPLACE, 整单全量替换）
    pub fn upsert(&self, document: &CalculationDocument) -> RepositoryResult<()> {
        let mut doc = document.clone();
        doc.updated_at = Some(Utc::now().naive_utc());

        let payload = serde_json::to_string(&doc)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO calculation_document (
                quotation_request_id, request_code, payload_json, updated_at
            ) VALUES (?1, ?2, ?3, datetime('now'))
            "#,
            params![doc.quotation_request_id, doc.request_code, payload],
        )?;

        Ok(())
    }

    /// 删除核算单
    ///
    /// # 返回
    /// - Ok(true): 删除了一条记录
    /// - Ok(false): 记录不存在
    pub fn delete(&self, quotation_request_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count = conn.execute(
            "DELETE FROM calculation_document WHERE quotation_request_id = ?1",
            params![quotation_request_id],
        )?;
        Ok(count > 0)
    }

    /// 列出全部已保存核算单的 (请求id, 请求编号)
    pub fn list_saved(&self) -> RepositoryResult<Vec<(String, String)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT quotation_request_id, request_code FROM calculation_document ORDER BY updated_at DESC",
        )?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}
