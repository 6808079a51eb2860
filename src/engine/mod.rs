// ==========================================
// 报价成本核算系统 - 引擎层
// ==========================================
// 职责: 成本核算业务规则, 纯计算
// 红线: Engine 不做 I/O 不拼 SQL; 除零/缺数据一律降级为 0, 永不失败
// ==========================================

pub mod allocation;
pub mod break_even;
pub mod production_cost;
pub mod profit;
pub mod recalc;
pub mod yield_resolver;

// 重导出核心引擎
pub use allocation::CostShare;
pub use break_even::BreakEven;
pub use production_cost::ProductionCost;
pub use profit::ProfitStatement;
pub use recalc::{CatalogContext, CostingEngine, CostingResult, ProductCosting};
pub use yield_resolver::YieldBreakdown;
