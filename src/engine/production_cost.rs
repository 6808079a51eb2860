// ==========================================
// 报价成本核算系统 - 生产成本计算
// ==========================================
// 职责: 加工流程工作副本 + 工期 → 单品生产成本（计划/实际）
// 约束: 纯函数, 无副作用
// ==========================================

use crate::domain::catalog::ProcessFlow;
use serde::{Deserialize, Serialize};

/// 单品生产成本
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionCost {
    pub planned: f64,
    pub actual: f64,
}

/// 单日计划成本 = Σ(计划数量 × 计划单价)（跨全部工段明细行）
pub fn per_day_planned_cost(flow: &ProcessFlow) -> f64 {
    flow.items()
        .map(|i| i.planned_qty * i.planned_unit_price)
        .sum()
}

/// 单日实际成本 = Σ(实际数量 × 实际单价)
pub fn per_day_actual_cost(flow: &ProcessFlow) -> f64 {
    flow.items()
        .map(|i| i.actual_qty * i.actual_unit_price)
        .sum()
}

/// 计算一条产品行的生产成本
///
/// - 计划总额 = 单日计划成本 × 允许工期（未填按单日处理，乘数为 1）
/// - 实际总额 = 单日实际成本 × 实际完成天数（未填同样按 1）
///   实际口径始终使用实际天数，不回退允许工期
/// - 未关联流程时成本为 0
pub fn production_cost(
    flow: Option<&ProcessFlow>,
    allowed_days: Option<f64>,
    actual_days: Option<f64>,
) -> ProductionCost {
    let flow = match flow {
        Some(f) => f,
        None => return ProductionCost::default(),
    };

    let planned = per_day_planned_cost(flow) * allowed_days.unwrap_or(1.0);
    let actual = per_day_actual_cost(flow) * actual_days.unwrap_or(1.0);

    ProductionCost {
        planned: if planned.is_finite() { planned } else { 0.0 },
        actual: if actual.is_finite() { actual } else { 0.0 },
    }
}
