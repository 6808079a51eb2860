// ==========================================
// 报价成本核算系统 - 目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 物料定额 / 加工流程 / 费用目录 的读取（引擎侧只读），
// 以及费用目录导入所需的 upsert
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{CostCatalogItem, FlowSection, MaterialStandard, ProcessFlow, YieldOutput};
use crate::domain::types::CostKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// CatalogRepository - 目录仓储
// ==========================================
pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepository {
    /// 创建新的 CatalogRepository 实例
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
    // 物料定额
    // ==========================================

    /// 按 id 查询物料定额（含产出列表）
    pub fn find_material_standard(
        &self,
        standard_id: &str,
    ) -> RepositoryResult<Option<MaterialStandard>> {
        let conn = self.get_conn()?;

        let head: Option<(String, String, f64)> = conn
            .query_row(
                "SELECT standard_id, standard_name, root_yield_pct FROM material_standard WHERE standard_id = ?1",
                params![standard_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (standard_id, standard_name, root_yield_pct) = match head {
            Some(h) => h,
            None => return Ok(None),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT output_name, yield_pct, is_primary
            FROM material_standard_output
            WHERE standard_id = ?1
            ORDER BY sort_order ASC, output_name ASC
            "#,
        )?;

        let outputs = stmt
            .query_map(params![standard_id], |row| {
                Ok(YieldOutput {
                    output_name: row.get(0)?,
                    yield_pct: row.get(1)?,
                    is_primary: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Some(MaterialStandard {
            standard_id,
            standard_name,
            root_yield_pct,
            outputs,
        }))
    }

    /// 列出全部物料定额（含产出列表）
    pub fn list_material_standards(&self) -> RepositoryResult<Vec<MaterialStandard>> {
        let ids: Vec<String> = {
            let conn = self.get_conn()?;
            let mut stmt = conn
                .prepare("SELECT standard_id FROM material_standard ORDER BY standard_name ASC")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<SqliteResult<Vec<_>>>()?;
            ids
        };

        let mut standards = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(std) = self.find_material_standard(&id)? {
                standards.push(std);
            }
        }
        Ok(standards)
    }

    /// 写入物料定额（测试种子与目录维护使用）
    pub fn upsert_material_standard(&self, standard: &MaterialStandard) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT OR REPLACE INTO material_standard (standard_id, standard_name, root_yield_pct)
            VALUES (?1, ?2, ?3)
            "#,
            params![standard.standard_id, standard.standard_name, standard.root_yield_pct],
        )?;

        tx.execute(
            "DELETE FROM material_standard_output WHERE standard_id = ?1",
            params![standard.standard_id],
        )?;

        for (i, output) in standard.outputs.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO material_standard_output (standard_id, output_name, yield_pct, is_primary, sort_order)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    standard.standard_id,
                    output.output_name,
                    output.yield_pct,
                    output.is_primary as i64,
                    i as i64,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    // ==========================================
    // 加工流程
    // ==========================================

    /// 按 id 查询加工流程（sections 以 JSON 存储）
    pub fn find_process_flow(&self, process_id: &str) -> RepositoryResult<Option<ProcessFlow>> {
        let conn = self.get_conn()?;

        let row: Option<(String, String, String)> = conn
            .query_row(
                "SELECT process_id, process_name, sections_json FROM process_flow WHERE process_id = ?1",
                params![process_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            Some((process_id, process_name, sections_json)) => {
                let sections: Vec<FlowSection> = serde_json::from_str(&sections_json)?;
                Ok(Some(ProcessFlow {
                    process_id,
                    process_name,
                    sections,
                }))
            }
            None => Ok(None),
        }
    }

    /// 列出全部加工流程
    pub fn list_process_flows(&self) -> RepositoryResult<Vec<ProcessFlow>> {
        let rows: Vec<(String, String, String)> = {
            let conn = self.get_conn()?;
            let mut stmt = conn.prepare(
                "SELECT process_id, process_name, sections_json FROM process_flow ORDER BY process_name ASC",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
                .collect::<SqliteResult<Vec<_>>>()?;
            rows
        };

        let mut flows = Vec::with_capacity(rows.len());
        for (process_id, process_name, sections_json) in rows {
            let sections: Vec<FlowSection> = serde_json::from_str(&sections_json)?;
            flows.push(ProcessFlow {
                process_id,
                process_name,
                sections,
            });
        }
        Ok(flows)
    }

    /// 写入加工流程
    pub fn upsert_process_flow(&self, flow: &ProcessFlow) -> RepositoryResult<()> {
        let sections_json = serde_json::to_string(&flow.sections)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO process_flow (process_id, process_name, sections_json)
            VALUES (?1, ?2, ?3)
            "#,
            params![flow.process_id, flow.process_name, sections_json],
        )?;
        Ok(())
    }

    // ==========================================
    // 费用目录
    // ==========================================

    /// 按费用类别列出费用目录项
    pub fn list_cost_catalog(&self, kind: Option<CostKind>) -> RepositoryResult<Vec<CostCatalogItem>> {
        let conn = self.get_conn()?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<CostCatalogItem> {
            Ok(CostCatalogItem {
                item_id: row.get(0)?,
                item_name: row.get(1)?,
                unit: row.get(2)?,
                kind: CostKind::from_str(&row.get::<_, String>(3)?),
            })
        };

        let items = match kind {
            Some(kind) => {
                let mut stmt = conn.prepare(
                    "SELECT item_id, item_name, unit, kind FROM cost_catalog WHERE kind = ?1 ORDER BY item_name ASC",
                )?;
                let items = stmt
                    .query_map(params![kind.to_db_str()], map_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                items
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT item_id, item_name, unit, kind FROM cost_catalog ORDER BY item_name ASC",
                )?;
                let items = stmt
                    .query_map([], map_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                items
            }
        };

        Ok(items)
    }

    /// 按名称查询费用目录项（导入去重使用）
    pub fn find_cost_catalog_by_name(
        &self,
        item_name: &str,
        kind: CostKind,
    ) -> RepositoryResult<Option<CostCatalogItem>> {
        let conn = self.get_conn()?;
        let item = conn
            .query_row(
                "SELECT item_id, item_name, unit, kind FROM cost_catalog WHERE item_name = ?1 AND kind = ?2",
                params![item_name, kind.to_db_str()],
                |row| {
                    Ok(CostCatalogItem {
                        item_id: row.get(0)?,
                        item_name: row.get(1)?,
                        unit: row.get(2)?,
                        kind: CostKind::from_str(&row.get::<_, String>(3)?),
                    })
                },
            )
            .optional()?;
        Ok(item)
    }

    /// 写入费用目录项
    pub fn upsert_cost_catalog_item(&self, item: &CostCatalogItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO cost_catalog (item_id, item_name, unit, kind)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![item.item_id, item.item_name, item.unit, item.kind.to_db_str()],
        )?;
        Ok(())
    }
}
