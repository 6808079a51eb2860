// ==========================================
// 重算引擎集成测试
// ==========================================
// 测试范围:
// 1. 全管线: 收率 → 生产成本 → 分摊 → 保本价 → 利润表
// 2. 库存抵扣与进口量
// 3. 附加费用行参与分摊
// 4. 目录缺失时的快照降级
// ==========================================

mod test_helpers;

use quotation_costing::domain::calculation::{
    CalculationDocument, CostGroup, CostGroupItem, ExportCostLine, ProductLine,
};
use quotation_costing::domain::catalog::{
    FlowItem, FlowSection, MaterialStandard, ProcessFlow, YieldOutput,
};
use quotation_costing::domain::types::ProductKey;
use quotation_costing::engine::{CatalogContext, CostingEngine};

fn standard_40_10_15() -> MaterialStandard {
    MaterialStandard {
        standard_id: "MS001".to_string(),
        standard_name: "原料A定额".to_string(),
        root_yield_pct: 15.0,
        outputs: vec![
            YieldOutput {
                output_name: "成品A".to_string(),
                yield_pct: 40.0,
                is_primary: true,
            },
            YieldOutput {
                output_name: "副产品B".to_string(),
                yield_pct: 10.0,
                is_primary: false,
            },
        ],
    }
}

fn catalogs() -> CatalogContext {
    let mut ctx = CatalogContext::default();
    ctx.material_standards
        .insert("MS001".to_string(), standard_40_10_15());
    ctx
}

fn sample_flow() -> ProcessFlow {
    ProcessFlow {
        process_id: "PF001".to_string(),
        process_name: "加工流程A".to_string(),
        sections: vec![
            FlowSection {
                section_name: "前处理".to_string(),
                items: vec![FlowItem {
                    item_name: "人工".to_string(),
                    planned_qty: 4.0,
                    planned_unit_price: 250_000.0,
                    actual_qty: 5.0,
                    actual_unit_price: 250_000.0,
                }],
            },
            FlowSection {
                section_name: "冷冻".to_string(),
                items: vec![FlowItem {
                    item_name: "电费".to_string(),
                    planned_qty: 100.0,
                    planned_unit_price: 3_000.0,
                    actual_qty: 120.0,
                    actual_unit_price: 3_000.0,
                }],
            },
        ],
    }
}

fn configured_line(qty: f64) -> ProductLine {
    let mut line = ProductLine::additional("成品A", qty, "kg");
    line.is_additional = false;
    line.additional_id = None;
    line.label = None;
    line.material_standard_ref = Some("MS001".to_string());
    line.selected_output = Some("成品A".to_string());
    line
}

// ==========================================
// 全管线测试
// ==========================================

#[test]
fn test_full_pipeline_single_product() {
    let mut doc = CalculationDocument::new("REQ001", "BG-2024-001");
    doc.tax_pct = 20.0;
    doc.reserve_pct = 5.0;

    let mut line = configured_line(1000.0);
    line.process_flow = Some(sample_flow());
    line.allowed_days = Some(2.0);
    line.actual_days = Some(1.0);
    line.set_byproduct_price("副产品B", 2_000.0);
    line.margin = 500.0;
    doc.products.push(line);

    let mut group = CostGroup::new("证书费");
    group.items.push(CostGroupItem {
        catalog_ref: None,
        item_name: "证书".to_string(),
        unit: "次".to_string(),
        planned: 400_000.0,
        actual: 400_000.0,
    });
    group.select(ProductKey::Product { index: 0 });
    doc.general_cost_groups.push(group);

    doc.export_costs.push(ExportCostLine {
        catalog_ref: None,
        item_name: "海运费".to_string(),
        unit: "柜".to_string(),
        planned: 500_000.0,
        actual: 500_000.0,
        planned_fx: None,
        actual_fx: None,
        planned_rate: None,
        actual_rate: None,
    });

    let result = CostingEngine::recompute(&doc, &catalogs());
    let p = result.product(&ProductKey::Product { index: 0 }).unwrap();

    // 收率: 1000 kg 订单 → 原料 16,666.67 kg, 主产出 1000 kg, 副产品 250 kg
    assert!((p.yield_breakdown.raw_material_needed - 16_666.666_666_666_668).abs() < 1e-6);
    assert!((p.yield_breakdown.primary_mass - 1000.0).abs() < 1e-6);

    // 生产成本: 单日 1,300,000 × 2 天 = 2,600,000; 实际 1,610,000 × 1 天
    assert_eq!(p.production_cost.planned, 2_600_000.0);
    assert_eq!(p.production_cost.actual, 1_610_000.0);

    // 单成员独享全额
    assert_eq!(p.general_share.planned, 400_000.0);
    assert_eq!(p.export_share.planned, 500_000.0);

    // 保本价: (3,500,000 - 副产品 250×2000) / 1000 = 3,000; 对客报价 3,500
    assert_eq!(p.break_even.total_cost_planned, 3_500_000.0);
    assert_eq!(p.break_even.byproduct_value, 500_000.0);
    assert!((p.break_even.break_even_price - 3_000.0).abs() < 1e-9);
    assert!((p.break_even.customer_price - 3_500.0).abs() < 1e-9);

    // 利润表: 营收 3500×1000 + 500,000 = 4,000,000; 成本 3,500,000
    let s = &result.statement;
    assert_eq!(s.expected_revenue, 4_000_000.0);
    assert_eq!(s.total_order_cost, 3_500_000.0);
    assert_eq!(s.profit_before_tax, 500_000.0);
    assert_eq!(s.tax_amount, 100_000.0);
    assert_eq!(s.profit_after_tax, 400_000.0);
    assert_eq!(s.reserve, 20_000.0);
    assert_eq!(s.net_profit, 380_000.0);
}

#[test]
fn test_inventory_deductions() {
    let mut doc = CalculationDocument::new("REQ002", "BG-2024-002");
    let mut line = configured_line(1000.0);
    line.finished_inventory = 200.0;
    line.raw_material_inventory = 3_333.333_333_333_333;
    doc.products.push(line);

    let result = CostingEngine::recompute(&doc, &catalogs());
    let y = &result.products[0].yield_breakdown;

    // 需生产量 = 1000 - 200 = 800
    assert_eq!(y.needed_output, 800.0);
    // 原料 = ((100×800)/40)/0.15 ≈ 13,333.33
    assert!((y.raw_material_needed - 13_333.333_333_333_334).abs() < 1e-6);
    // 进口量 = 13,333.33 - 3,333.33 = 10,000
    assert!((y.raw_material_to_import - 10_000.0).abs() < 1e-6);
}

#[test]
fn test_additional_line_participates_in_allocations() {
    let mut doc = CalculationDocument::new("REQ003", "BG-2024-003");
    // 两条未配置定额的普通行 + 一条附加费用行
    let mut l0 = ProductLine::additional("成品A", 600.0, "kg");
    l0.is_additional = false;
    l0.additional_id = None;
    l0.label = None;
    let mut l1 = l0.clone();
    l1.quantity = 400.0;
    doc.products.push(l0);
    doc.products.push(l1);
    doc.products.push(ProductLine::additional("打样费", 200.0, "件"));

    let additional_key = doc.product_key(2).unwrap();

    let mut group = CostGroup::new("包装费");
    group.items.push(CostGroupItem {
        catalog_ref: None,
        item_name: "纸箱".to_string(),
        unit: "批".to_string(),
        planned: 1_200_000.0,
        actual: 0.0,
    });
    group.select(ProductKey::Product { index: 0 });
    group.select(ProductKey::Product { index: 1 });
    group.select(additional_key.clone());
    doc.general_cost_groups.push(group);

    doc.export_costs.push(ExportCostLine {
        catalog_ref: None,
        item_name: "报关费".to_string(),
        unit: "次".to_string(),
        planned: 1_200.0,
        actual: 0.0,
        planned_fx: None,
        actual_fx: None,
        planned_rate: None,
        actual_rate: None,
    });

    let result = CostingEngine::recompute(&doc, &catalogs());

    // 一般费用按数量 600:400:200 分摊
    let p0 = result.product(&ProductKey::Product { index: 0 }).unwrap();
    let p1 = result.product(&ProductKey::Product { index: 1 }).unwrap();
    let pa = result.product(&additional_key).unwrap();
    assert!((p0.general_share.planned - 600_000.0).abs() < 1e-6);
    assert!((p1.general_share.planned - 400_000.0).abs() < 1e-6);
    assert!((pa.general_share.planned - 200_000.0).abs() < 1e-6);

    // 出口费用: 未配置定额时需生产量降级为订单数量, 同为 600:400:200
    assert!((p0.export_share.planned - 600.0).abs() < 1e-9);
    assert!((p1.export_share.planned - 400.0).abs() < 1e-9);
    assert!((pa.export_share.planned - 200.0).abs() < 1e-9);
}

#[test]
fn test_missing_standard_degrades_to_snapshot() {
    let mut doc = CalculationDocument::new("REQ004", "BG-2024-004");
    let mut line = configured_line(1000.0);
    line.material_standard_ref = Some("MS-DELETED".to_string());
    line.yield_pct = Some(40.0);
    line.root_yield_pct = Some(15.0);
    doc.products.push(line);

    // 目录上下文为空 → 走快照降级
    let result = CostingEngine::recompute(&doc, &CatalogContext::default());
    let y = &result.products[0].yield_breakdown;

    assert!((y.raw_material_needed - 16_666.666_666_666_668).abs() < 1e-6);
    // 副产品无从得知 → 空, 保本价不含副产品价值
    assert!(y.byproduct_masses.is_empty());
    assert_eq!(result.products[0].break_even.byproduct_value, 0.0);
}

#[test]
fn test_empty_document_produces_zero_statement() {
    let doc = CalculationDocument::new("REQ005", "BG-2024-005");
    let result = CostingEngine::recompute(&doc, &CatalogContext::default());

    assert!(result.products.is_empty());
    assert_eq!(result.statement.expected_revenue, 0.0);
    assert_eq!(result.statement.total_order_cost, 0.0);
    assert_eq!(result.statement.net_profit, 0.0);
}

#[test]
fn test_orphan_group_still_counts_in_order_cost() {
    // 孤立费用组不进任何单品成本, 但订单利润表照计
    let mut doc = CalculationDocument::new("REQ006", "BG-2024-006");
    doc.products.push(configured_line(1000.0));

    let mut group = CostGroup::new("孤立费用");
    group.items.push(CostGroupItem {
        catalog_ref: None,
        item_name: "杂费".to_string(),
        unit: "次".to_string(),
        planned: 300_000.0,
        actual: 0.0,
    });
    // 不选任何产品
    doc.general_cost_groups.push(group);

    let result = CostingEngine::recompute(&doc, &catalogs());
    assert_eq!(result.products[0].general_share.planned, 0.0);
    assert_eq!(result.statement.total_order_cost, 300_000.0);
}
