// ==========================================
// 报价成本核算系统 - 核心库
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// 系统定位: 生产出口企业经营管理 - 报价成本核算
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 成本核算管线
pub mod engine;

// 导入层 - 费用目录外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// SQL 性能追踪
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - Tauri 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CostKind, ProductKey, QuotationStatus};

// 领域实体
pub use domain::{
    CalculationDocument, CostCatalogItem, CostGroup, CostGroupItem, ExportCostLine,
    MaterialStandard, ProcessFlow, ProductLine, Quotation, QuotationRequest,
    QuotationRequestLine, YieldOutput,
};

// 引擎
pub use engine::{CatalogContext, CostingEngine, CostingResult, ProductCosting, ProfitStatement};

// API
pub use api::{CatalogApi, ConfigApi, CostingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "报价成本核算系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
