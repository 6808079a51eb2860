// ==========================================
// 报价成本核算系统 - 保本价计算
// ==========================================
// 职责: 单品总成本 - 副产品价值 → 单位保本价 → 对客报价
// 约束: 永不抛错, 非有限中间值一律降级为 0
// ==========================================

use crate::domain::calculation::ProductLine;
use crate::engine::allocation::CostShare;
use crate::engine::production_cost::ProductionCost;
use crate::engine::yield_resolver::YieldBreakdown;
use serde::{Deserialize, Serialize};

/// 单品保本价计算结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakEven {
    /// 总成本（计划口径 = 生产成本 + 一般费用份额 + 出口费用份额）
    pub total_cost_planned: f64,
    /// 总成本（实际口径）
    pub total_cost_actual: f64,
    /// 副产品价值 = Σ(用户录入保本价 × 副产品产量)
    pub byproduct_value: f64,
    /// 单位保本价 = (计划总成本 - 副产品价值) / 主产出产量; 产量为 0 时为 0
    pub break_even_price: f64,
    /// 对客报价 = 保本价 + 利润加成
    pub customer_price: f64,
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// 计算一条产品行的保本价。
///
/// 报价以计划口径为准；实际口径总成本并列给出，仅用于对比复盘。
pub fn compute(
    line: &ProductLine,
    yield_breakdown: &YieldBreakdown,
    production: ProductionCost,
    general: CostShare,
    export: CostShare,
) -> BreakEven {
    let total_cost_planned =
        finite_or_zero(production.planned + general.planned + export.planned);
    let total_cost_actual = finite_or_zero(production.actual + general.actual + export.actual);

    let byproduct_value: f64 = yield_breakdown
        .byproduct_masses
        .iter()
        .map(|(name, mass)| line.byproduct_price(name) * mass)
        .sum();
    let byproduct_value = finite_or_zero(byproduct_value);

    let break_even_price = if yield_breakdown.primary_mass == 0.0 {
        0.0
    } else {
        finite_or_zero((total_cost_planned - byproduct_value) / yield_breakdown.primary_mass)
    };

    let customer_price = finite_or_zero(break_even_price + line.margin);

    BreakEven {
        total_cost_planned,
        total_cost_actual,
        byproduct_value,
        break_even_price,
        customer_price,
    }
}
