// ==========================================
// 报价成本核算系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod calculation_repo;
pub mod catalog_repo;
pub mod error;
pub mod quotation_repo;

// 重导出核心仓储
pub use calculation_repo::CalculationRepository;
pub use catalog_repo::CatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use quotation_repo::QuotationRepository;
