// ==========================================
// 报价成本核算系统 - API层
// ==========================================
// 职责: 面向前端的业务操作入口, 编排引擎与仓储
// 红线: 引擎保持纯函数, I/O 全部在本层完成
// ==========================================

pub mod catalog_api;
pub mod config_api;
pub mod costing_api;
pub mod error;

// 重导出核心 API
pub use catalog_api::CatalogApi;
pub use config_api::ConfigApi;
pub use costing_api::{CalculationView, CostingApi};
pub use error::{ApiError, ApiResult};
