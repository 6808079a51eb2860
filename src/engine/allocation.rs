// ==========================================
// 报价成本核算系统 - 共享费用分摊
// ==========================================
// 职责: 单一分摊算法, 两种选择语义
//   - 一般费用组: 多个命名桶, 各桶由产品显式选入, 权重 = 订单数量
//   - 出口费用: 单一隐式桶覆盖全部行, 权重 = 需生产量
// 规则: 选择集为空不分摊; 恰有一个成员独享全额（不稀释）;
//       多成员按权重占比; 权重合计为 0 时全部为 0
// ==========================================

use crate::domain::calculation::CostGroup;
use crate::domain::types::ProductKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 一条产品行在某类共享费用中的份额（计划/实际口径）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostShare {
    pub planned: f64,
    pub actual: f64,
}

impl CostShare {
    fn add(&mut self, planned: f64, actual: f64) {
        self.planned += planned;
        self.actual += actual;
    }
}

/// 核心分摊规则：把 total 按权重分到各成员。
///
/// - 空成员集 ⇒ 空结果（孤立费用，不计入任何产品）
/// - 恰有一个成员 ⇒ 独享全额，无论其权重（含 0）——
///   单一共享费用只支撑一条行时不应被稀释
/// - 多个成员 ⇒ 按 weight/Σweight 占比；Σweight == 0 ⇒ 全部为 0
pub fn allocate(total: f64, members: &[(ProductKey, f64)]) -> BTreeMap<ProductKey, f64> {
    let mut shares = BTreeMap::new();

    match members.len() {
        0 => {}
        1 => {
            shares.insert(members[0].0.clone(), total);
        }
        _ => {
            let total_weight: f64 = members.iter().map(|(_, w)| w).sum();
            for (key, weight) in members {
                let share = if total_weight == 0.0 {
                    0.0
                } else {
                    let v = total * (weight / total_weight);
                    if v.is_finite() {
                        v
                    } else {
                        0.0
                    }
                };
                shares.insert(key.clone(), share);
            }
        }
    }

    shares
}

/// 一般费用分摊：对每个费用组独立执行核心规则后按产品累加。
///
/// - 组的成员 = 组选择集 ∩ 当前核算单中存在的行
///   （行被删除后残留的选择项直接忽略）
/// - 权重 = 行的订单数量
/// - 一条行可同时选入多个组，份额跨组求和
pub fn general_allocations(
    groups: &[CostGroup],
    quantity_by_key: &BTreeMap<ProductKey, f64>,
) -> BTreeMap<ProductKey, CostShare> {
    let mut result: BTreeMap<ProductKey, CostShare> = quantity_by_key
        .keys()
        .map(|k| (k.clone(), CostShare::default()))
        .collect();

    for group in groups {
        let members: Vec<(ProductKey, f64)> = group
            .selected
            .iter()
            .filter_map(|key| quantity_by_key.get(key).map(|qty| (key.clone(), *qty)))
            .collect();

        let planned_shares = allocate(group.planned_total(), &members);
        let actual_shares = allocate(group.actual_total(), &members);

        for (key, planned) in planned_shares {
            let actual = actual_shares.get(&key).copied().unwrap_or(0.0);
            result.entry(key).or_default().add(planned, actual);
        }
    }

    result
}

/// 出口费用分摊：单一隐式桶覆盖全部行，权重 = 需生产量。
///
/// 附加费用行与普通行同权参与；其需生产量由收率解算降级为
/// 原始数量（见 yield_resolver），不会被静默排除。
pub fn export_allocations(
    planned_total: f64,
    actual_total: f64,
    needed_output_by_key: &BTreeMap<ProductKey, f64>,
) -> BTreeMap<ProductKey, CostShare> {
    let members: Vec<(ProductKey, f64)> = needed_output_by_key
        .iter()
        .map(|(k, w)| (k.clone(), *w))
        .collect();

    let planned_shares = allocate(planned_total, &members);
    let actual_shares = allocate(actual_total, &members);

    let mut result: BTreeMap<ProductKey, CostShare> = needed_output_by_key
        .keys()
        .map(|k| (k.clone(), CostShare::default()))
        .collect();

    for (key, planned) in planned_shares {
        let actual = actual_shares.get(&key).copied().unwrap_or(0.0);
        result.entry(key).or_default().add(planned, actual);
    }

    result
}
