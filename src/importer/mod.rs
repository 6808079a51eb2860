// ==========================================
// 报价成本核算系统 - 导入模块
// ==========================================
// 职责: Excel/CSV 文件解析与费用目录导入
// ==========================================

pub mod cost_catalog_importer;
pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use cost_catalog_importer::{CostCatalogImporter, ImportSummary};
pub use error::{ImportError, ImportResult};
pub use file_parser::parse_file;
