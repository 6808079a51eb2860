// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时测试数据库 + API 测试环境 + 种子数据
// ==========================================

#![allow(dead_code)]

use quotation_costing::api::{CatalogApi, ConfigApi, CostingApi};
use quotation_costing::config::ConfigManager;
use quotation_costing::db;
use quotation_costing::domain::catalog::{MaterialStandard, YieldOutput};
use quotation_costing::domain::quotation::{QuotationRequest, QuotationRequestLine};
use quotation_costing::importer::CostCatalogImporter;
use quotation_costing::repository::{
    CalculationRepository, CatalogRepository, QuotationRepository,
};
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// API 测试环境：共享连接上的全套仓储与 API
pub struct CostingTestEnv {
    _db_file: NamedTempFile,
    pub db_path: String,
    pub costing_api: CostingApi,
    pub catalog_api: CatalogApi,
    pub config_api: ConfigApi,
    pub importer: CostCatalogImporter,
    pub calculation_repo: Arc<CalculationRepository>,
    pub catalog_repo: Arc<CatalogRepository>,
    pub quotation_repo: Arc<QuotationRepository>,
}

impl CostingTestEnv {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let (db_file, db_path) = create_test_db()?;

        let conn = db::open_sqlite_connection(&db_path)?;
        let conn = Arc::new(Mutex::new(conn));

        let calculation_repo = Arc::new(CalculationRepository::from_connection(conn.clone()));
        let catalog_repo = Arc::new(CatalogRepository::from_connection(conn.clone()));
        let quotation_repo = Arc::new(QuotationRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn)?);

        let costing_api = CostingApi::new(
            calculation_repo.clone(),
            catalog_repo.clone(),
            quotation_repo.clone(),
            config_manager.clone(),
        );
        let catalog_api = CatalogApi::new(catalog_repo.clone());
        let config_api = ConfigApi::new(config_manager);
        let importer = CostCatalogImporter::new(catalog_repo.clone());

        Ok(Self {
            _db_file: db_file,
            db_path,
            costing_api,
            catalog_api,
            config_api,
            importer,
            calculation_repo,
            catalog_repo,
            quotation_repo,
        })
    }

    /// 写入一条报价请求及其请求行
    pub fn seed_request(
        &self,
        request_id: &str,
        request_code: &str,
        lines: &[(&str, f64, &str)],
    ) -> Result<(), Box<dyn Error>> {
        let request = QuotationRequest {
            request_id: request_id.to_string(),
            request_code: request_code.to_string(),
            customer_name: Some("测试客户".to_string()),
            created_at: chrono::Utc::now().naive_utc(),
        };

        let lines: Vec<QuotationRequestLine> = lines
            .iter()
            .enumerate()
            .map(|(i, (name, qty, unit))| QuotationRequestLine {
                line_id: format!("{}-L{}", request_id, i + 1),
                request_id: request_id.to_string(),
                product_ref: None,
                product_name: name.to_string(),
                quantity: *qty,
                unit: unit.to_string(),
                sort_order: i as i32,
            })
            .collect();

        self.quotation_repo.create_request(&request, &lines)?;
        Ok(())
    }

    /// 写入标准测试定额: 主产出 40%, 副产出 10%, 根收率 15%
    pub fn seed_standard(&self, standard_id: &str) -> Result<(), Box<dyn Error>> {
        let standard = MaterialStandard {
            standard_id: standard_id.to_string(),
            standard_name: "原料A定额".to_string(),
            root_yield_pct: 15.0,
            outputs: vec![
                YieldOutput {
                    output_name: "成品A".to_string(),
                    yield_pct: 40.0,
                    is_primary: true,
                },
                YieldOutput {
                    output_name: "副产品B".to_string(),
                    yield_pct: 10.0,
                    is_primary: false,
                },
            ],
        };
        self.catalog_repo.upsert_material_standard(&standard)?;
        Ok(())
    }
}

/// 独立打开一个到测试库的连接（用于直接断言表内容）
pub fn open_raw(db_path: &str) -> Connection {
    db::open_sqlite_connection(db_path).expect("无法打开测试数据库")
}
