// ==========================================
// 报价成本核算系统 - 报价请求/报价记录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::quotation::{Quotation, QuotationRequest, QuotationRequestLine};
use crate::domain::types::QuotationStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| NaiveDateTime::default())
}

// ==========================================
// QuotationRepository - 报价仓储
// ==========================================
/// 报价仓储
/// 职责: quotation_request / quotation_request_line / quotation 表的数据访问
pub struct QuotationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl QuotationRepository {
    /// 创建新的 QuotationRepository 实例
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

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 报价请求
    // ==========================================

    /// 按 id 查询报价请求
    pub fn find_request(&self, request_id: &str) -> RepositoryResult<Option<QuotationRequest>> {
        let conn = self.get_conn()?;
        let request = conn
            .query_row(
                "SELECT request_id, request_code, customer_name, created_at FROM quotation_request WHERE request_id = ?1",
                params![request_id],
                |row| {
                    Ok(QuotationRequest {
                        request_id: row.get(0)?,
                        request_code: row.get(1)?,
                        customer_name: row.get(2)?,
                        created_at: parse_datetime(&row.get::<_, String>(3)?),
                    })
                },
            )
            .optional()?;
        Ok(request)
    }

    /// 查询请求的全部请求行（按 sort_order）
    pub fn list_request_lines(&self, request_id: &str) -> RepositoryResult<Vec<QuotationRequestLine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT line_id, request_id, product_ref, product_name, quantity, unit, sort_order
            FROM quotation_request_line
            WHERE request_id = ?1
            ORDER BY sort_order ASC, line_id ASC
            "#,
        )?;

        let lines = stmt
            .query_map(params![request_id], |row| {
                Ok(QuotationRequestLine {
                    line_id: row.get(0)?,
                    request_id: row.get(1)?,
                    product_ref: row.get(2)?,
                    product_name: row.get(3)?,
                    quantity: row.get(4)?,
                    unit: row.get(5)?,
                    sort_order: row.get(6)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(lines)
    }

    /// 创建报价请求（含请求行, 事务）
    pub fn create_request(
        &self,
        request: &QuotationRequest,
        lines: &[QuotationRequestLine],
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO quotation_request (request_id, request_code, customer_name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                request.request_id,
                request.request_code,
                request.customer_name,
                request.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        for line in lines {
            tx.execute(
                r#"
                INSERT INTO quotation_request_line (line_id, request_id, product_ref, product_name, quantity, unit, sort_order)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    line.line_id,
                    line.request_id,
                    line.product_ref,
                    line.product_name,
                    line.quantity,
                    line.unit,
                    line.sort_order,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    // ==========================================
    // 正式报价记录
    // ==========================================

    /// 写入 promote 产出的正式报价记录
    pub fn create_quotation(&self, quotation: &Quotation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO quotation (
                quotation_id, request_id, quote_code, status,
                validity_days, notes, expected_revenue, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                quotation.quotation_id,
                quotation.request_id,
                quotation.quote_code,
                quotation.status.to_db_str(),
                quotation.validity_days,
                quotation.notes,
                quotation.expected_revenue,
                quotation.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        Ok(())
    }

    /// 查询某请求名下的全部报价记录（最近在前）
    pub fn list_quotations_by_request(&self, request_id: &str) -> RepositoryResult<Vec<Quotation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT quotation_id, request_id, quote_code, status,
                   validity_days, notes, expected_revenue, created_at
            FROM quotation
            WHERE request_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;

        let quotations = stmt
            .query_map(params![request_id], |row| {
                Ok(Quotation {
                    quotation_id: row.get(0)?,
                    request_id: row.get(1)?,
                    quote_code: row.get(2)?,
                    status: QuotationStatus::from_str(&row.get::<_, String>(3)?),
                    validity_days: row.get(4)?,
                    notes: row.get(5)?,
                    expected_revenue: row.get(6)?,
                    created_at: parse_datetime(&row.get::<_, String>(7)?),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(quotations)
    }
}
