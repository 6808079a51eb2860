// ==========================================
// 报价成本核算系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod calculation;
pub mod catalog;
pub mod quotation;
pub mod types;

// 重导出核心类型
pub use calculation::{
    ByproductPrice, CalculationDocument, CostGroup, CostGroupItem, ExportCostLine, ProductLine,
};
pub use catalog::{CostCatalogItem, FlowItem, FlowSection, MaterialStandard, ProcessFlow, YieldOutput};
pub use quotation::{Quotation, QuotationRequest, QuotationRequestLine};
pub use types::{CostKind, ProductKey, QuotationStatus};
