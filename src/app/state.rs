// ==========================================
// 报价成本核算系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CatalogApi, ConfigApi, CostingApi};
use crate::config::ConfigManager;
use crate::db;
use crate::importer::CostCatalogImporter;
use crate::perf::install_sqlite_tracing;
use crate::repository::{CalculationRepository, CatalogRepository, QuotationRepository};

/// 应用状态
///
/// 包含所有API实例和共享资源, 在 Tauri 应用中作为全局状态管理
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 核算API
    pub costing_api: Arc<CostingApi>,

    /// 目录API
    pub catalog_api: Arc<CatalogApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 费用目录导入器
    pub cost_catalog_importer: Arc<CostCatalogImporter>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 打开共享连接 → 建表（幂等）→ 初始化仓储与API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        // Repository层（共享同一连接）
        let calculation_repo = Arc::new(CalculationRepository::from_connection(conn.clone()));
        let catalog_repo = Arc::new(CatalogRepository::from_connection(conn.clone()));
        let quotation_repo = Arc::new(QuotationRepository::from_connection(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // API层
        let costing_api = Arc::new(CostingApi::new(
            calculation_repo,
            catalog_repo.clone(),
            quotation_repo,
            config_manager.clone(),
        ));
        let catalog_api = Arc::new(CatalogApi::new(catalog_repo.clone()));
        let config_api = Arc::new(ConfigApi::new(config_manager));
        let cost_catalog_importer = Arc::new(CostCatalogImporter::new(catalog_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            costing_api,
            catalog_api,
            config_api,
            cost_catalog_importer,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// 优先级: 环境变量 QUOTATION_COSTING_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("QUOTATION_COSTING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./quotation_costing.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("quotation-costing-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("quotation-costing");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("quotation_costing.db");
    }

    path.to_string_lossy().to_string()
}
