// ==========================================
// 报价成本核算系统 - 收率解算
// ==========================================
// 职责: 订单量 + 库存 → 需生产量 → 原料需求 → 各产出（主产品/副产品）产量
// 约束: 纯函数, 无副作用, 除零路径一律降级为 0, 永不失败
// ==========================================

use crate::domain::calculation::ProductLine;
use crate::domain::catalog::MaterialStandard;
use serde::{Deserialize, Serialize};

/// 需生产量 = max(订单量 - 成品库存, 0)
pub fn needed_output(order_qty: f64, finished_inventory: f64) -> f64 {
    (order_qty - finished_inventory).max(0.0)
}

/// 原料需求量
///
/// 公式: ((100 × 需生产量) / 产出收率%) / (根收率% / 100)
/// 任一收率为 0 时返回 0（不做除法）
pub fn raw_material_needed(needed: f64, output_yield_pct: f64, root_yield_pct: f64) -> f64 {
    if output_yield_pct == 0.0 || root_yield_pct == 0.0 {
        return 0.0;
    }
    let v = ((100.0 * needed) / output_yield_pct) / (root_yield_pct / 100.0);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// 需进口原料量 = max(原料需求量 - 原料库存, 0)
pub fn material_to_import(raw_needed: f64, raw_inventory: f64) -> f64 {
    (raw_needed - raw_inventory).max(0.0)
}

/// 单条产出的产量 = 原料需求量 × (根收率%/100) × (产出收率%/100)
pub fn output_mass(raw_needed: f64, root_yield_pct: f64, output_yield_pct: f64) -> f64 {
    let v = raw_needed * (root_yield_pct / 100.0) * (output_yield_pct / 100.0);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

// ==========================================
// YieldBreakdown - 收率解算结果
// ==========================================
/// 一条产品行的完整收率解算结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YieldBreakdown {
    /// 需生产量
    pub needed_output: f64,
    /// 原料需求量
    pub raw_material_needed: f64,
    /// 需进口原料量
    pub raw_material_to_import: f64,
    /// 主产出产量
    pub primary_mass: f64,
    /// 副产品产量（按产出名称）
    pub byproduct_masses: Vec<(String, f64)>,
}

/// 解算一条产品行
///
/// 收率取数口径：
/// - 定额在目录中存在：所选产出取行上的覆写收率（有则用），否则取定额值；
///   根收率与副产品收率取定额值
/// - 定额缺失（目录记录被删除等）：退回行上保存的收率快照，
///   副产品产量无从得知，降级为空列表（§部分/陈旧但不崩溃）
pub fn resolve(line: &ProductLine, standard: Option<&MaterialStandard>) -> YieldBreakdown {
    let needed = needed_output(line.quantity, line.finished_inventory);

    let (root_pct, output_pct) = match standard {
        Some(std) => {
            let selected = line
                .selected_output
                .as_deref()
                .and_then(|name| std.find_output(name))
                .or_else(|| std.primary_output());
            let output_pct = line
                .yield_pct
                .unwrap_or_else(|| selected.map(|o| o.yield_pct).unwrap_or(0.0));
            (std.root_yield_pct, output_pct)
        }
        None => (
            line.root_yield_pct.unwrap_or(0.0),
            line.yield_pct.unwrap_or(0.0),
        ),
    };

    let raw_needed = raw_material_needed(needed, output_pct, root_pct);
    let to_import = material_to_import(raw_needed, line.raw_material_inventory);
    let primary_mass = output_mass(raw_needed, root_pct, output_pct);

    let byproduct_masses = match standard {
        Some(std) => {
            let selected_name = line
                .selected_output
                .as_deref()
                .or_else(|| std.primary_output().map(|o| o.output_name.as_str()));
            std.outputs
                .iter()
                .filter(|o| Some(o.output_name.as_str()) != selected_name)
                .map(|o| {
                    (
                        o.output_name.clone(),
                        output_mass(raw_needed, root_pct, o.yield_pct),
                    )
                })
                .collect()
        }
        None => Vec::new(),
    };

    YieldBreakdown {
        needed_output: needed,
        raw_material_needed: raw_needed,
        raw_material_to_import: to_import,
        primary_mass,
        byproduct_masses,
    }
}
