// ==========================================
// 报价成本核算系统 - 目录 API
// ==========================================
// 职责: 物料定额 / 加工流程 / 费用目录 的查询与维护
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::catalog::{CostCatalogItem, MaterialStandard, ProcessFlow};
use crate::domain::types::CostKind;
use crate::repository::CatalogRepository;
use std::sync::Arc;

pub struct CatalogApi {
    catalog_repo: Arc<CatalogRepository>,
}

impl CatalogApi {
    pub fn new(catalog_repo: Arc<CatalogRepository>) -> Self {
        Self { catalog_repo }
    }

    // ===== 物料定额 =====

    pub fn list_material_standards(&self) -> ApiResult<Vec<MaterialStandard>> {
        Ok(self.catalog_repo.list_material_standards()?)
    }

    pub fn get_material_standard(&self, standard_id: &str) -> ApiResult<MaterialStandard> {
        self.catalog_repo
            .find_material_standard(standard_id)?
            .ok_or_else(|| ApiError::NotFound(format!("物料定额不存在: {}", standard_id)))
    }

    /// 保存物料定额（主产出必须恰好一个）
    pub fn save_material_standard(&self, standard: &MaterialStandard) -> ApiResult<()> {
        if standard.standard_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("定额ID不能为空".to_string()));
        }
        let primary_count = standard.outputs.iter().filter(|o| o.is_primary).count();
        if primary_count != 1 {
            return Err(ApiError::ValidationError(format!(
                "物料定额 {} 必须且只能有一个主产出, 当前 {} 个",
                standard.standard_id, primary_count
            )));
        }
        self.catalog_repo.upsert_material_standard(standard)?;
        Ok(())
    }

    // ===== 加工流程 =====

    pub fn list_process_flows(&self) -> ApiResult<Vec<ProcessFlow>> {
        Ok(self.catalog_repo.list_process_flows()?)
    }

    pub fn get_process_flow(&self, process_id: &str) -> ApiResult<ProcessFlow> {
        self.catalog_repo
            .find_process_flow(process_id)?
            .ok_or_else(|| ApiError::NotFound(format!("加工流程不存在: {}", process_id)))
    }

    pub fn save_process_flow(&self, flow: &ProcessFlow) -> ApiResult<()> {
        if flow.process_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("流程ID不能为空".to_string()));
        }
        self.catalog_repo.upsert_process_flow(flow)?;
        Ok(())
    }

    // ===== 费用目录 =====

    /// 按类别列出费用目录（kind 为空则全量返回）
    pub fn list_cost_catalog(&self, kind: Option<&str>) -> ApiResult<Vec<CostCatalogItem>> {
        let kind = kind.map(CostKind::from_str);
        Ok(self.catalog_repo.list_cost_catalog(kind)?)
    }

    pub fn save_cost_catalog_item(&self, item: &CostCatalogItem) -> ApiResult<()> {
        if item.item_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("费用项名称不能为空".to_string()));
        }
        self.catalog_repo.upsert_cost_catalog_item(item)?;
        Ok(())
    }
}
