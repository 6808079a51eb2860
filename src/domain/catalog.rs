// ==========================================
// 报价成本核算系统 - 目录实体
// ==========================================
// 职责: 物料定额（收率表）、加工流程、费用目录
// 红线: 目录数据对引擎只读；核算单持有加工流程的工作副本
// ==========================================

use crate::domain::types::CostKind;
use serde::{Deserialize, Serialize};

// ==========================================
// MaterialStandard - 物料定额（收率表）
// ==========================================
/// 物料定额：一种原料到各产出（主产品 + 副产品）的收率表。
/// 所有产出共享一个根收率 root_yield_pct（原料到中间品的回收率）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialStandard {
    pub standard_id: String,
    pub standard_name: String,
    /// 根收率（%）
    pub root_yield_pct: f64,
    /// 产出列表，恰有一条 is_primary
    pub outputs: Vec<YieldOutput>,
}

/// 收率表中的一条产出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldOutput {
    pub output_name: String,
    /// 产出收率（%）
    pub yield_pct: f64,
    pub is_primary: bool,
}

impl MaterialStandard {
    /// 主产出（收率表应恰有一条；数据异常时返回 None，引擎按 0 收率降级）
    pub fn primary_output(&self) -> Option<&YieldOutput> {
        self.outputs.iter().find(|o| o.is_primary)
    }

    /// 按名称查找产出
    pub fn find_output(&self, name: &str) -> Option<&YieldOutput> {
        self.outputs.iter().find(|o| o.output_name == name)
    }

    /// 副产品产出（非主产出）
    pub fn byproducts(&self) -> impl Iterator<Item = &YieldOutput> {
        self.outputs.iter().filter(|o| !o.is_primary)
    }
}

// ==========================================
// ProcessFlow - 加工流程
// ==========================================
/// 加工流程：有序工段列表，每个工段为有序费用明细行。
/// 目录中保存计划口径的基准；打开核算单时复制为工作副本，
/// 计算器对工作副本的修改不回写目录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessFlow {
    pub process_id: String,
    pub process_name: String,
    pub sections: Vec<FlowSection>,
}

/// 流程工段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSection {
    pub section_name: String,
    pub items: Vec<FlowItem>,
}

/// 工段内费用明细行（单日口径）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowItem {
    pub item_name: String,
    pub planned_qty: f64,
    pub planned_unit_price: f64,
    pub actual_qty: f64,
    pub actual_unit_price: f64,
}

impl ProcessFlow {
    /// 遍历所有费用明细行（跨工段）
    pub fn items(&self) -> impl Iterator<Item = &FlowItem> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }
}

// ==========================================
// CostCatalogItem - 费用目录项
// ==========================================
/// 共享费用定义（一般费用或出口费用），只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostCatalogItem {
    pub item_id: String,
    pub item_name: String,
    pub unit: String,
    pub kind: CostKind,
}
