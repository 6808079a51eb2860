// ==========================================
// 报价成本核算系统 - 核算 API
// ==========================================
// 职责: 核算单的 打开/重算/保存/删除/升级为正式报价
// 约束: 引擎不做 I/O —— 本层负责加载目录上下文后调用引擎
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::calculation::{CalculationDocument, ProductLine};
use crate::domain::quotation::Quotation;
use crate::domain::types::QuotationStatus;
use crate::engine::{CatalogContext, CostingEngine, CostingResult};
use crate::perf::PerfGuard;
use crate::repository::{CalculationRepository, CatalogRepository, QuotationRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// CalculationView - 核算单视图
// ==========================================
/// 返回给前端的核算单完整状态：输入 + 全部派生值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationView {
    pub document: CalculationDocument,
    pub result: CostingResult,
}

// ==========================================
// CostingApi - 核算 API
// ==========================================
pub struct CostingApi {
    calculation_repo: Arc<CalculationRepository>,
    catalog_repo: Arc<CatalogRepository>,
    quotation_repo: Arc<QuotationRepository>,
    config_manager: Arc<ConfigManager>,
}

impl CostingApi {
    pub fn new(
        calculation_repo: Arc<CalculationRepository>,
        catalog_repo: Arc<CatalogRepository>,
        quotation_repo: Arc<QuotationRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            calculation_repo,
            catalog_repo,
            quotation_repo,
            config_manager,
        }
    }

    /// 加载核算单引用到的目录上下文（缺失的定额直接跳过，引擎按快照降级）
    fn load_catalog_context(&self, document: &CalculationDocument) -> ApiResult<CatalogContext> {
        let mut ctx = CatalogContext::default();
        for line in &document.products {
            if let Some(standard_id) = &line.material_standard_ref {
                if ctx.material_standards.contains_key(standard_id) {
                    continue;
                }
                match self.catalog_repo.find_material_standard(standard_id)? {
                    Some(standard) => {
                        ctx.material_standards.insert(standard_id.clone(), standard);
                    }
                    None => {
                        tracing::warn!(standard_id = %standard_id, "物料定额已不存在, 按行上快照降级");
                    }
                }
            }
        }
        Ok(ctx)
    }

    /// 打开核算单：有保存记录则加载，否则从报价请求行新建
    ///
    /// 新建时税率/预留比例取系统配置默认值
    pub fn open_calculation(&self, quotation_request_id: &str) -> ApiResult<CalculationView> {
        let _perf = PerfGuard::new("open_calculation");

        let document = match self.calculation_repo.load(quotation_request_id)? {
            Some(doc) => doc,
            None => {
                let request = self
                    .quotation_repo
                    .find_request(quotation_request_id)?
                    .ok_or_else(|| {
                        ApiError::NotFound(format!("报价请求不存在: {}", quotation_request_id))
                    })?;
                let lines = self.quotation_repo.list_request_lines(quotation_request_id)?;

                let mut doc = CalculationDocument::new(&request.request_id, &request.request_code);
                doc.tax_pct = self.config_manager.get_default_tax_pct()?;
                doc.reserve_pct = self.config_manager.get_default_reserve_pct()?;
                doc.products = lines.iter().map(ProductLine::from_request_line).collect();
                doc
            }
        };

        self.view_of(document)
    }

    /// 重算核算单（不落库）。前端每次输入变更后调用, 拿到全部派生值
    pub fn recompute(&self, document: CalculationDocument) -> ApiResult<CalculationView> {
        self.view_of(document)
    }

    /// 保存核算单：重算 → 回写派生字段 → 整单替换落库
    pub fn save_calculation(&self, document: CalculationDocument) -> ApiResult<CalculationView> {
        let _perf = PerfGuard::new("save_calculation");

        let mut view = self.view_of(document)?;
        self.calculation_repo.upsert(&view.document)?;
        // upsert 会刷新 updated_at, 重新读出以保持视图一致
        if let Some(saved) = self.calculation_repo.load(&view.document.quotation_request_id)? {
            view.document = saved;
        }
        Ok(view)
    }

    /// 删除核算单
    pub fn delete_calculation(&self, quotation_request_id: &str) -> ApiResult<bool> {
        Ok(self.calculation_repo.delete(quotation_request_id)?)
    }

    /// 升级为正式报价记录（promote）
    ///
    /// # 参数
    /// - validity_days: 有效期（天），缺省取系统配置默认值
    /// - status: 报价状态（DRAFT/SENT/...）
    /// - notes: 备注
    ///
    /// # 约束
    /// - 必须先保存过核算单；预期营收取 promote 时刻的重算结果
    pub fn promote(
        &self,
        quotation_request_id: &str,
        validity_days: Option<i32>,
        status: &str,
        notes: Option<String>,
    ) -> ApiResult<Quotation> {
        let _perf = PerfGuard::new("promote_quotation");

        let document = self
            .calculation_repo
            .load(quotation_request_id)?
            .ok_or_else(|| {
                ApiError::BusinessRuleViolation(format!(
                    "报价请求 {} 尚未保存核算单, 无法生成正式报价",
                    quotation_request_id
                ))
            })?;

        let catalogs = self.load_catalog_context(&document)?;
        let result = CostingEngine::recompute(&document, &catalogs);

        let validity_days = match validity_days {
            Some(d) if d > 0 => d,
            Some(d) => {
                return Err(ApiError::InvalidInput(format!("有效期必须为正数: {}", d)));
            }
            None => self.config_manager.get_default_validity_days()?,
        };

        let quotation_id = Uuid::new_v4().to_string();
        let quotation = Quotation {
            quotation_id: quotation_id.clone(),
            request_id: quotation_request_id.to_string(),
            quote_code: format!("{}-Q{}", document.request_code, &quotation_id[..8]),
            status: QuotationStatus::from_str(status),
            validity_days,
            notes,
            expected_revenue: result.statement.expected_revenue,
            created_at: Utc::now().naive_utc(),
        };

        self.quotation_repo.create_quotation(&quotation)?;
        tracing::info!(
            request_id = %quotation_request_id,
            quote_code = %quotation.quote_code,
            expected_revenue = quotation.expected_revenue,
            "已生成正式报价记录"
        );

        Ok(quotation)
    }

    /// 查询某请求名下的全部正式报价记录
    pub fn list_quotations(&self, quotation_request_id: &str) -> ApiResult<Vec<Quotation>> {
        Ok(self.quotation_repo.list_quotations_by_request(quotation_request_id)?)
    }

    /// 为某行关联物料定额：写入引用并快照收率（定额缺失时报 NotFound）
    ///
    /// 快照用于目录记录日后被删除时的降级展示
    pub fn attach_material_standard(
        &self,
        document: &mut CalculationDocument,
        line_index: usize,
        standard_id: &str,
    ) -> ApiResult<()> {
        let standard = self
            .catalog_repo
            .find_material_standard(standard_id)?
            .ok_or_else(|| ApiError::NotFound(format!("物料定额不存在: {}", standard_id)))?;

        let line = document
            .products
            .get_mut(line_index)
            .ok_or_else(|| ApiError::InvalidInput(format!("产品行序号越界: {}", line_index)))?;

        let primary = standard.primary_output();
        line.material_standard_ref = Some(standard.standard_id.clone());
        line.root_yield_pct = Some(standard.root_yield_pct);
        line.selected_output = primary.map(|o| o.output_name.clone());
        line.yield_pct = primary.map(|o| o.yield_pct);
        Ok(())
    }

    /// 为某行关联加工流程：复制目录流程为工作副本
    pub fn attach_process_flow(
        &self,
        document: &mut CalculationDocument,
        line_index: usize,
        process_id: &str,
    ) -> ApiResult<()> {
        let flow = self
            .catalog_repo
            .find_process_flow(process_id)?
            .ok_or_else(|| ApiError::NotFound(format!("加工流程不存在: {}", process_id)))?;

        let line = document
            .products
            .get_mut(line_index)
            .ok_or_else(|| ApiError::InvalidInput(format!("产品行序号越界: {}", line_index)))?;

        line.process_ref = Some(flow.process_id.clone());
        line.process_flow = Some(flow);
        Ok(())
    }

    /// 重算并回写派生字段, 组装视图
    fn view_of(&self, mut document: CalculationDocument) -> ApiResult<CalculationView> {
        let catalogs = self.load_catalog_context(&document)?;
        let result = CostingEngine::recompute(&document, &catalogs);
        CostingEngine::apply(&mut document, &result);
        Ok(CalculationView { document, result })
    }
}
