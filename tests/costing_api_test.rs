// ==========================================
// CostingApi 集成测试
// ==========================================
// 测试范围:
// 1. open_calculation: 新建(取配置默认值) / 加载已保存
// 2. save_calculation: 重算回写 + 落库
// 3. promote: 正式报价记录生成与业务规则
// 4. attach_material_standard: 定额关联与快照
// ==========================================

mod test_helpers;

use quotation_costing::api::ApiError;
use quotation_costing::config::config_keys;
use quotation_costing::domain::types::{ProductKey, QuotationStatus};
use test_helpers::CostingTestEnv;

#[test]
fn test_open_calculation_builds_fresh_document_from_request() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg"), ("成品B", 400.0, "kg")])
        .expect("种子数据失败");

    let view = env.costing_api.open_calculation("REQ001").expect("打开失败");

    assert_eq!(view.document.quotation_request_id, "REQ001");
    assert_eq!(view.document.request_code, "BG-2024-001");
    assert_eq!(view.document.products.len(), 2);
    assert_eq!(view.document.products[0].product_name, "成品A");
    assert_eq!(view.document.products[0].quantity, 1000.0);
    // 新建核算单取系统配置默认值
    assert_eq!(view.document.tax_pct, 20.0);
    assert_eq!(view.document.reserve_pct, 5.0);
    // 未配置状态: 派生值全 0 但结构完整
    assert_eq!(view.result.products.len(), 2);
    assert_eq!(view.result.statement.expected_revenue, 0.0);
}

#[test]
fn test_open_calculation_uses_configured_defaults() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.config_api
        .set_config(config_keys::DEFAULT_TAX_PCT, "15")
        .expect("配置失败");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");

    let view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    assert_eq!(view.document.tax_pct, 15.0);
}

#[test]
fn test_open_calculation_unknown_request() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");

    let result = env.costing_api.open_calculation("REQ-NONE");
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_save_then_reopen_returns_saved_document() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");
    env.seed_standard("MS001").expect("种子数据失败");

    let mut view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    env.costing_api
        .attach_material_standard(&mut view.document, 0, "MS001")
        .expect("关联定额失败");
    view.document.products[0].margin = 500.0;

    let saved = env
        .costing_api
        .save_calculation(view.document)
        .expect("保存失败");
    assert!(saved.document.updated_at.is_some());
    // 保存时派生字段已回写
    assert!(saved.document.products[0].raw_material_needed.is_some());

    let reopened = env.costing_api.open_calculation("REQ001").expect("再次打开失败");
    assert_eq!(reopened.document.products[0].margin, 500.0);
    assert_eq!(
        reopened.document.products[0].material_standard_ref,
        Some("MS001".to_string())
    );
}

#[test]
fn test_attach_material_standard_snapshots_yields() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");
    env.seed_standard("MS001").expect("种子数据失败");

    let mut view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    env.costing_api
        .attach_material_standard(&mut view.document, 0, "MS001")
        .expect("关联定额失败");

    let line = &view.document.products[0];
    assert_eq!(line.selected_output, Some("成品A".to_string()));
    assert_eq!(line.yield_pct, Some(40.0));
    assert_eq!(line.root_yield_pct, Some(15.0));

    // 关联后重算出真实收率链
    let view = env.costing_api.recompute(view.document).expect("重算失败");
    let p = view
        .result
        .product(&ProductKey::Product { index: 0 })
        .unwrap();
    assert!((p.yield_breakdown.raw_material_needed - 16_666.666_666_666_668).abs() < 1e-6);
}

#[test]
fn test_attach_material_standard_unknown_id() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");

    let mut view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    let result = env
        .costing_api
        .attach_material_standard(&mut view.document, 0, "MS-NONE");
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_delete_calculation() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");

    let view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    env.costing_api.save_calculation(view.document).expect("保存失败");

    assert!(env.costing_api.delete_calculation("REQ001").expect("删除失败"));
    assert!(!env.costing_api.delete_calculation("REQ001").expect("删除失败"));

    // 删除后再打开 → 从请求行重新生成
    let view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    assert!(view.document.updated_at.is_none());
}

// ==========================================
// promote 测试
// ==========================================

#[test]
fn test_promote_requires_saved_calculation() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");

    let result = env.costing_api.promote("REQ001", None, "DRAFT", None);
    assert!(matches!(result, Err(ApiError::BusinessRuleViolation(_))));
}

#[test]
fn test_promote_creates_quotation_record() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");
    env.seed_standard("MS001").expect("种子数据失败");

    let mut view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    env.costing_api
        .attach_material_standard(&mut view.document, 0, "MS001")
        .expect("关联定额失败");
    view.document.products[0].margin = 500.0;
    env.costing_api.save_calculation(view.document).expect("保存失败");

    let quotation = env
        .costing_api
        .promote("REQ001", Some(45), "SENT", Some("首轮报价".to_string()))
        .expect("promote 失败");

    assert_eq!(quotation.request_id, "REQ001");
    assert!(quotation.quote_code.starts_with("BG-2024-001-Q"));
    assert_eq!(quotation.status, QuotationStatus::Sent);
    assert_eq!(quotation.validity_days, 45);
    // 预期营收 = 对客报价 × 主产出产量 (500 加成 × 1000 kg, 成本为 0)
    assert!((quotation.expected_revenue - 500_000.0).abs() < 1e-6);

    let listed = env.costing_api.list_quotations("REQ001").expect("查询失败");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].quote_code, quotation.quote_code);
}

#[test]
fn test_promote_default_validity_days() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");

    let view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    env.costing_api.save_calculation(view.document).expect("保存失败");

    let quotation = env
        .costing_api
        .promote("REQ001", None, "DRAFT", None)
        .expect("promote 失败");
    assert_eq!(quotation.validity_days, 30);
    assert_eq!(quotation.status, QuotationStatus::Draft);
}

#[test]
fn test_promote_rejects_non_positive_validity() {
    let env = CostingTestEnv::new().expect("无法创建测试环境");
    env.seed_request("REQ001", "BG-2024-001", &[("成品A", 1000.0, "kg")])
        .expect("种子数据失败");

    let view = env.costing_api.open_calculation("REQ001").expect("打开失败");
    env.costing_api.save_calculation(view.document).expect("保存失败");

    let result = env.costing_api.promote("REQ001", Some(0), "DRAFT", None);
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}
