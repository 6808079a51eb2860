// ==========================================
// 报价成本核算系统 - 全量重算引擎
// ==========================================
// 职责: 核算单 + 目录上下文 → 全部派生值（单品成本 + 订单利润表）
// ==========================================
// 红线: 严格依赖序全量重算（收率 → 单品成本 → 分摊 → 保本价 → 汇总）。
// 分摊是多对多关系, 改动产品 A 的选组可能改变产品 B 的份额,
// 因此不做局部增量更新, 任一输入变化后整单重推。
// ==========================================

use crate::domain::calculation::CalculationDocument;
use crate::domain::catalog::MaterialStandard;
use crate::domain::types::ProductKey;
use crate::engine::allocation::{self, CostShare};
use crate::engine::break_even::{self, BreakEven};
use crate::engine::production_cost::{self, ProductionCost};
use crate::engine::profit::{self, ProfitStatement, RevenueInput};
use crate::engine::yield_resolver::{self, YieldBreakdown};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

// ==========================================
// CatalogContext - 目录上下文
// ==========================================
/// 重算所需的已解析目录数据。引擎不做 I/O，由调用方
/// （api 层）加载后传入；缺失的定额按行上快照降级。
#[derive(Debug, Clone, Default)]
pub struct CatalogContext {
    pub material_standards: HashMap<String, MaterialStandard>,
}

impl CatalogContext {
    pub fn standard(&self, standard_id: &str) -> Option<&MaterialStandard> {
        self.material_standards.get(standard_id)
    }
}

// ==========================================
// ProductCosting - 单品核算结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCosting {
    pub key: ProductKey,
    pub product_name: String,
    #[serde(rename = "yield")]
    pub yield_breakdown: YieldBreakdown,
    pub production_cost: ProductionCost,
    pub general_share: CostShare,
    pub export_share: CostShare,
    pub break_even: BreakEven,
}

// ==========================================
// CostingResult - 重算结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostingResult {
    /// 单品结果，按文档行序
    pub products: Vec<ProductCosting>,
    /// 订单利润表
    pub statement: ProfitStatement,
    /// 耗时(毫秒)
    pub elapsed_ms: i64,
}

impl CostingResult {
    /// 按产品标识查找单品结果
    pub fn product(&self, key: &ProductKey) -> Option<&ProductCosting> {
        self.products.iter().find(|p| &p.key == key)
    }
}

// ==========================================
// CostingEngine - 全量重算引擎
// ==========================================
/// 纯重算管线。无内部状态、无 I/O，同一输入必得同一输出（幂等）。
/// 复杂度 O(产品行数 × 费用组数)，同步执行，无需取消语义。
pub struct CostingEngine;

impl CostingEngine {
    /// 全量重算。
    ///
    /// 依赖序: 收率解算 → 单品生产成本 → 一般/出口费用分摊 →
    /// 保本价 → 订单利润汇总。任何派生值在读取前都经过本次推导，
    /// 不存在陈旧的跨产品份额。
    #[instrument(skip_all, fields(request_id = %document.quotation_request_id, products = document.products.len()))]
    pub fn recompute(document: &CalculationDocument, catalogs: &CatalogContext) -> CostingResult {
        let start = std::time::Instant::now();

        let keyed = document.keyed_products();

        // 1. 收率解算 + 单品生产成本
        let mut yields: Vec<YieldBreakdown> = Vec::with_capacity(keyed.len());
        let mut productions: Vec<ProductionCost> = Vec::with_capacity(keyed.len());
        for (_, line) in &keyed {
            let standard = line
                .material_standard_ref
                .as_deref()
                .and_then(|id| catalogs.standard(id));
            yields.push(yield_resolver::resolve(line, standard));
            productions.push(production_cost::production_cost(
                line.process_flow.as_ref(),
                line.allowed_days,
                line.actual_days,
            ));
        }

        // 2. 共享费用分摊
        let quantity_by_key: BTreeMap<ProductKey, f64> = keyed
            .iter()
            .map(|(k, line)| (k.clone(), line.quantity))
            .collect();
        let needed_by_key: BTreeMap<ProductKey, f64> = keyed
            .iter()
            .zip(yields.iter())
            .map(|((k, _), y)| (k.clone(), y.needed_output))
            .collect();

        let general = allocation::general_allocations(&document.general_cost_groups, &quantity_by_key);
        let export = allocation::export_allocations(
            document.export_planned_total(),
            document.export_actual_total(),
            &needed_by_key,
        );

        // 3. 保本价
        let mut products: Vec<ProductCosting> = Vec::with_capacity(keyed.len());
        for (i, (key, line)) in keyed.iter().enumerate() {
            let general_share = general.get(key).copied().unwrap_or_default();
            let export_share = export.get(key).copied().unwrap_or_default();
            let break_even = break_even::compute(
                line,
                &yields[i],
                productions[i],
                general_share,
                export_share,
            );
            products.push(ProductCosting {
                key: key.clone(),
                product_name: line.product_name.clone(),
                yield_breakdown: yields[i].clone(),
                production_cost: productions[i],
                general_share,
                export_share,
                break_even,
            });
        }

        // 4. 订单利润汇总
        let revenue_inputs: Vec<RevenueInput> = products
            .iter()
            .map(|p| RevenueInput {
                customer_price: p.break_even.customer_price,
                primary_mass: p.yield_breakdown.primary_mass,
                byproduct_value: p.break_even.byproduct_value,
                production_cost_planned: p.production_cost.planned,
            })
            .collect();

        let statement = profit::rollup(
            &revenue_inputs,
            document.general_planned_grand_total(),
            document.export_planned_total(),
            document.tax_pct,
            document.reserve_pct,
        );

        let elapsed_ms = start.elapsed().as_millis() as i64;
        tracing::debug!(elapsed_ms, "核算单重算完成");

        CostingResult {
            products,
            statement,
            elapsed_ms,
        }
    }

    /// 把派生值回写到核算单的冗余字段（保存前调用）。
    ///
    /// 落库这些冗余值是为了目录记录被删后仍能按最近一次口径展示（降级）。
    pub fn apply(document: &mut CalculationDocument, result: &CostingResult) {
        for (i, line) in document.products.iter_mut().enumerate() {
            let costing = match result.products.get(i) {
                Some(c) => c,
                None => continue,
            };
            line.needed_output = Some(costing.yield_breakdown.needed_output);
            line.raw_material_needed = Some(costing.yield_breakdown.raw_material_needed);
            line.raw_material_to_import = Some(costing.yield_breakdown.raw_material_to_import);
            line.production_cost_planned = Some(costing.production_cost.planned);
            line.production_cost_actual = Some(costing.production_cost.actual);
            line.general_cost_planned = Some(costing.general_share.planned);
            line.general_cost_actual = Some(costing.general_share.actual);
            line.export_cost_planned = Some(costing.export_share.planned);
            line.export_cost_actual = Some(costing.export_share.actual);
            line.break_even_price = Some(costing.break_even.break_even_price);
        }
    }
}
