// ==========================================
// 报价成本核算系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、更新
// 存储: config_kv 表 (key-value, scope_id='global')
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 一条配置项（API 层列表返回使用）
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConfigItem {
    pub scope_id: String,
    pub key: String,
    pub value: String,
    pub updated_at: Option<String>,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（UPSERT, scope_id='global'）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 列出全部 global 配置项
    pub fn list_configs(&self) -> Result<Vec<ConfigItem>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare(
            "SELECT scope_id, key, value, updated_at FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let items = stmt
            .query_map([], |row| {
                Ok(ConfigItem {
                    scope_id: row.get(0)?,
                    key: row.get(1)?,
                    value: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    // ===== 核算默认值 =====

    /// 新建核算单的默认税率（%）
    pub fn get_default_tax_pct(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_TAX_PCT, "20")?;
        Ok(value.parse::<f64>().unwrap_or(20.0))
    }

    /// 新建核算单的默认预留基金比例（%）
    pub fn get_default_reserve_pct(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_RESERVE_PCT, "5")?;
        Ok(value.parse::<f64>().unwrap_or(5.0))
    }

    /// 出口费用录入的默认汇率
    pub fn get_default_fx_rate(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_FX_RATE, "24500")?;
        Ok(value.parse::<f64>().unwrap_or(24_500.0))
    }

    /// promote 生成报价记录的默认有效期（天）
    pub fn get_default_validity_days(&self) -> Result<i32, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_VALIDITY_DAYS, "30")?;
        Ok(value.parse::<i32>().unwrap_or(30))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 核算默认值
    pub const DEFAULT_TAX_PCT: &str = "default_tax_pct";
    pub const DEFAULT_RESERVE_PCT: &str = "default_reserve_pct";
    pub const DEFAULT_FX_RATE: &str = "default_fx_rate";

    // 报价
    pub const DEFAULT_VALIDITY_DAYS: &str = "default_validity_days";
}
