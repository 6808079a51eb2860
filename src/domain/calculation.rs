// ==========================================
// 报价成本核算系统 - 核算单聚合
// ==========================================
// 职责: 核算单（CalculationDocument）及其子实体定义
// 约束: 派生字段只由引擎回写（engine::recalc::apply），界面只改输入字段
// ==========================================

use crate::domain::catalog::ProcessFlow;
use crate::domain::quotation::QuotationRequestLine;
use crate::domain::types::ProductKey;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ==========================================
// ByproductPrice - 副产品保本价录入
// ==========================================
/// 按产出名称录入的副产品保本价（元/kg），归属于所在产品行，
/// 不跨物料定额共享，避免同名产出歧义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByproductPrice {
    pub output_name: String,
    pub break_even_price: f64,
}

// ==========================================
// ProductLine - 产品行 / 附加费用行
// ==========================================
/// 核算单中的一条被核算行。
///
/// - 普通产品行：对应报价请求的一条请求行（line_ref）
/// - 附加费用行（is_additional）：无请求行支撑的临时核算对象
///   （打样、模具等），带自由文本 label 与显式数量/单位，
///   与普通产品行一同参与一般费用与出口费用分摊
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLine {
    // ===== 行来源 =====
    /// 对应的报价请求行 id（附加费用行为 None）
    pub line_ref: Option<String>,
    pub product_ref: Option<String>,
    pub product_name: String,
    /// 是否附加费用行
    #[serde(default)]
    pub is_additional: bool,
    /// 附加费用行说明（仅附加费用行）
    pub label: Option<String>,
    /// 附加费用行稳定标识（仅附加费用行，行创建时分配）
    pub additional_id: Option<String>,

    // ===== 订单输入 =====
    pub quantity: f64,
    pub unit: String,
    pub quote_code: Option<String>,

    // ===== 收率输入 =====
    pub material_standard_ref: Option<String>,
    /// 所选产出（主产品）名称
    pub selected_output: Option<String>,
    /// 所选产出收率快照/覆写（%），定额缺失时作降级依据
    pub yield_pct: Option<f64>,
    /// 根收率快照（%），定额缺失时作降级依据
    pub root_yield_pct: Option<f64>,
    /// 成品库存
    #[serde(default)]
    pub finished_inventory: f64,
    /// 原料库存
    #[serde(default)]
    pub raw_material_inventory: f64,

    // ===== 生产成本输入 =====
    pub process_ref: Option<String>,
    /// 加工流程工作副本（可就地编辑，不回写目录）
    pub process_flow: Option<ProcessFlow>,
    /// 允许工期（天）
    pub allowed_days: Option<f64>,
    /// 实际完成（天）
    pub actual_days: Option<f64>,

    // ===== 定价输入 =====
    /// 副产品保本价（按产出名称）
    #[serde(default)]
    pub byproduct_prices: Vec<ByproductPrice>,
    /// 利润加成（元/kg 或 元/单位）
    #[serde(default)]
    pub margin: f64,
    pub notes: Option<String>,

    // ===== 派生字段（引擎回写，保存时落库便于缺目录降级展示） =====
    pub needed_output: Option<f64>,
    pub raw_material_needed: Option<f64>,
    pub raw_material_to_import: Option<f64>,
    pub production_cost_planned: Option<f64>,
    pub production_cost_actual: Option<f64>,
    pub general_cost_planned: Option<f64>,
    pub general_cost_actual: Option<f64>,
    pub export_cost_planned: Option<f64>,
    pub export_cost_actual: Option<f64>,
    pub break_even_price: Option<f64>,
}

impl ProductLine {
    /// 从报价请求行创建普通产品行（未配置状态，派生字段为空）
    pub fn from_request_line(line: &QuotationRequestLine) -> Self {
        Self {
            line_ref: Some(line.line_id.clone()),
            product_ref: line.product_ref.clone(),
            product_name: line.product_name.clone(),
            is_additional: false,
            label: None,
            additional_id: None,
            quantity: line.quantity,
            unit: line.unit.clone(),
            quote_code: None,
            material_standard_ref: None,
            selected_output: None,
            yield_pct: None,
            root_yield_pct: None,
            finished_inventory: 0.0,
            raw_material_inventory: 0.0,
            process_ref: None,
            process_flow: None,
            allowed_days: None,
            actual_days: None,
            byproduct_prices: Vec::new(),
            margin: 0.0,
            notes: None,
            needed_output: None,
            raw_material_needed: None,
            raw_material_to_import: None,
            production_cost_planned: None,
            production_cost_actual: None,
            general_cost_planned: None,
            general_cost_actual: None,
            export_cost_planned: None,
            export_cost_actual: None,
            break_even_price: None,
        }
    }

    /// 创建附加费用行（打样、模具等临时核算对象）
    pub fn additional(label: &str, quantity: f64, unit: &str) -> Self {
        Self {
            line_ref: None,
            product_ref: None,
            product_name: label.to_string(),
            is_additional: true,
            label: Some(label.to_string()),
            additional_id: Some(Uuid::new_v4().to_string()),
            quantity,
            unit: unit.to_string(),
            quote_code: None,
            material_standard_ref: None,
            selected_output: None,
            yield_pct: None,
            root_yield_pct: None,
            finished_inventory: 0.0,
            raw_material_inventory: 0.0,
            process_ref: None,
            process_flow: None,
            allowed_days: None,
            actual_days: None,
            byproduct_prices: Vec::new(),
            margin: 0.0,
            notes: None,
            needed_output: None,
            raw_material_needed: None,
            raw_material_to_import: None,
            production_cost_planned: None,
            production_cost_actual: None,
            general_cost_planned: None,
            general_cost_actual: None,
            export_cost_planned: None,
            export_cost_actual: None,
            break_even_price: None,
        }
    }

    /// 某副产品的用户录入保本价（未录入为 0）
    pub fn byproduct_price(&self, output_name: &str) -> f64 {
        self.byproduct_prices
            .iter()
            .find(|p| p.output_name == output_name)
            .map(|p| p.break_even_price)
            .unwrap_or(0.0)
    }

    /// 设置副产品保本价（存在则更新，不存在则追加）
    pub fn set_byproduct_price(&mut self, output_name: &str, price: f64) {
        match self
            .byproduct_prices
            .iter_mut()
            .find(|p| p.output_name == output_name)
        {
            Some(entry) => entry.break_even_price = price,
            None => self.byproduct_prices.push(ByproductPrice {
                output_name: output_name.to_string(),
                break_even_price: price,
            }),
        }
    }
}

// ==========================================
// CostGroupItem - 费用明细行
// ==========================================
/// 费用组内的一条费用明细（引用费用目录项 + 计划/实际金额）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostGroupItem {
    pub catalog_ref: Option<String>,
    pub item_name: String,
    pub unit: String,
    #[serde(default)]
    pub planned: f64,
    #[serde(default)]
    pub actual: f64,
}

// ==========================================
// CostGroup - 一般费用组
// ==========================================
/// 命名费用桶：费用明细列表 + 产品选择集。
///
/// 不变式: 选择集为空时该组不向任何产品分摊（孤立费用，
/// 不计入任何单品成本）——这是刻意行为，不是默认全选。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostGroup {
    pub group_id: String,
    pub group_name: String,
    #[serde(default)]
    pub items: Vec<CostGroupItem>,
    /// 选择集：选入本组分摊的产品行/附加费用行
    #[serde(default)]
    pub selected: BTreeSet<ProductKey>,
}

impl CostGroup {
    pub fn new(group_name: &str) -> Self {
        Self {
            group_id: Uuid::new_v4().to_string(),
            group_name: group_name.to_string(),
            items: Vec::new(),
            selected: BTreeSet::new(),
        }
    }

    /// 批量加入费用明细（显式多选，替代目录端的 "ALL" 哨兵值）
    pub fn add_items(&mut self, items: impl IntoIterator<Item = CostGroupItem>) {
        self.items.extend(items);
    }

    /// 将产品选入本组
    pub fn select(&mut self, key: ProductKey) {
        self.selected.insert(key);
    }

    /// 将产品移出本组
    pub fn deselect(&mut self, key: &ProductKey) {
        self.selected.remove(key);
    }

    /// 组内计划总额
    pub fn planned_total(&self) -> f64 {
        self.items.iter().map(|i| i.planned).sum()
    }

    /// 组内实际总额
    pub fn actual_total(&self) -> f64 {
        self.items.iter().map(|i| i.actual).sum()
    }
}

// ==========================================
// ExportCostLine - 出口费用行
// ==========================================
/// 出口费用：隐式由全部产品行/附加费用行分摊（无选择集）。
/// 支持直接录入本币金额，或录入（外币金额 × 汇率）后两者保持同步。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportCostLine {
    pub catalog_ref: Option<String>,
    pub item_name: String,
    pub unit: String,
    #[serde(default)]
    pub planned: f64,
    #[serde(default)]
    pub actual: f64,
    /// 计划外币金额
    pub planned_fx: Option<f64>,
    /// 实际外币金额
    pub actual_fx: Option<f64>,
    /// 计划汇率
    pub planned_rate: Option<f64>,
    /// 实际汇率
    pub actual_rate: Option<f64>,
}

impl ExportCostLine {
    /// 按（外币金额 × 汇率）录入计划金额并同步本币金额
    pub fn set_planned_fx(&mut self, fx_amount: f64, rate: f64) {
        self.planned_fx = Some(fx_amount);
        self.planned_rate = Some(rate);
        self.planned = fx_amount * rate;
    }

    /// 按（外币金额 × 汇率）录入实际金额并同步本币金额
    pub fn set_actual_fx(&mut self, fx_amount: f64, rate: f64) {
        self.actual_fx = Some(fx_amount);
        self.actual_rate = Some(rate);
        self.actual = fx_amount * rate;
    }
}

// ==========================================
// CalculationDocument - 核算单
// ==========================================
/// 持久化聚合：一次报价请求的完整核算状态，整单保存/加载（全量替换）。
/// 单编辑者单会话独占，无并发写控制。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationDocument {
    pub quotation_request_id: String,
    pub request_code: String,
    /// 税率（%，0-100 用户录入）
    #[serde(default)]
    pub tax_pct: f64,
    /// 预留基金比例（%，0-100 用户录入）
    #[serde(default)]
    pub reserve_pct: f64,
    /// 产品行 + 附加费用行
    #[serde(default)]
    pub products: Vec<ProductLine>,
    /// 一般费用工作表（从目录选入的费用行，费用组的取数来源）
    #[serde(default)]
    pub general_costs: Vec<CostGroupItem>,
    /// 一般费用组
    #[serde(default)]
    pub general_cost_groups: Vec<CostGroup>,
    /// 出口费用行
    #[serde(default)]
    pub export_costs: Vec<ExportCostLine>,
    pub updated_at: Option<NaiveDateTime>,
}

impl CalculationDocument {
    /// 创建空核算单
    pub fn new(quotation_request_id: &str, request_code: &str) -> Self {
        Self {
            quotation_request_id: quotation_request_id.to_string(),
            request_code: request_code.to_string(),
            tax_pct: 0.0,
            reserve_pct: 0.0,
            products: Vec::new(),
            general_costs: Vec::new(),
            general_cost_groups: Vec::new(),
            export_costs: Vec::new(),
            updated_at: None,
        }
    }

    /// 第 index 行的产品标识
    ///
    /// 普通产品行按序号定位；附加费用行按稳定 uuid 定位，
    /// 行增删不会使其它附加费用行的选择集失效
    pub fn product_key(&self, index: usize) -> Option<ProductKey> {
        let line = self.products.get(index)?;
        if line.is_additional {
            let id = line.additional_id.clone().unwrap_or_default();
            Some(ProductKey::Additional { id })
        } else {
            Some(ProductKey::Product { index })
        }
    }

    /// 全部行的 (标识, 行) 对，按文档顺序
    pub fn keyed_products(&self) -> Vec<(ProductKey, &ProductLine)> {
        self.products
            .iter()
            .enumerate()
            .filter_map(|(i, line)| self.product_key(i).map(|k| (k, line)))
            .collect()
    }

    /// 出口费用计划总额（全组无条件合计）
    pub fn export_planned_total(&self) -> f64 {
        self.export_costs.iter().map(|c| c.planned).sum()
    }

    /// 出口费用实际总额
    pub fn export_actual_total(&self) -> f64 {
        self.export_costs.iter().map(|c| c.actual).sum()
    }

    /// 一般费用计划总额（全组无条件合计，与选择集无关）
    pub fn general_planned_grand_total(&self) -> f64 {
        self.general_cost_groups.iter().map(|g| g.planned_total()).sum()
    }

    /// 一般费用实际总额
    pub fn general_actual_grand_total(&self) -> f64 {
        self.general_cost_groups.iter().map(|g| g.actual_total()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_key_distinguishes_additional_lines() {
        let mut doc = CalculationDocument::new("REQ001", "BG-2024-001");
        doc.products.push(ProductLine::from_request_line(
            &crate::domain::quotation::QuotationRequestLine {
                line_id: "L1".to_string(),
                request_id: "REQ001".to_string(),
                product_ref: None,
                product_name: "成品A".to_string(),
                quantity: 1000.0,
                unit: "kg".to_string(),
                sort_order: 0,
            },
        ));
        doc.products.push(ProductLine::additional("打样费", 1.0, "批"));

        assert_eq!(doc.product_key(0), Some(ProductKey::Product { index: 0 }));
        match doc.product_key(1) {
            Some(ProductKey::Additional { id }) => assert!(!id.is_empty()),
            other => panic!("期望附加费用行标识, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_export_fx_entry_keeps_amount_in_sync() {
        let mut line = ExportCostLine {
            catalog_ref: None,
            item_name: "海运费".to_string(),
            unit: "柜".to_string(),
            planned: 0.0,
            actual: 0.0,
            planned_fx: None,
            actual_fx: None,
            planned_rate: None,
            actual_rate: None,
        };

        line.set_planned_fx(1000.0, 24_500.0);
        assert_eq!(line.planned, 24_500_000.0);
        assert_eq!(line.planned_fx, Some(1000.0));
        assert_eq!(line.planned_rate, Some(24_500.0));
    }

    #[test]
    fn test_group_totals() {
        let mut group = CostGroup::new("认证费");
        group.add_items(vec![
            CostGroupItem {
                catalog_ref: None,
                item_name: "证书".to_string(),
                unit: "次".to_string(),
                planned: 600_000.0,
                actual: 650_000.0,
            },
            CostGroupItem {
                catalog_ref: None,
                item_name: "检测".to_string(),
                unit: "次".to_string(),
                planned: 400_000.0,
                actual: 380_000.0,
            },
        ]);

        assert_eq!(group.planned_total(), 1_000_000.0);
        assert_eq!(group.actual_total(), 1_030_000.0);
    }
}
