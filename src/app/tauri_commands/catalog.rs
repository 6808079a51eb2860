use crate::app::state::AppState;
use crate::domain::catalog::{CostCatalogItem, MaterialStandard, ProcessFlow};

use super::common::map_api_error;

// ==========================================
// 目录维护相关命令
// ==========================================

/// 查询全部物料定额
#[tauri::command(rename_all = "snake_case")]
pub async fn list_material_standards(
    state: tauri::State<'_, AppState>,
) -> Result<String, String> {
    let standards = state
        .catalog_api
        .list_material_standards()
        .map_err(map_api_error)?;

    serde_json::to_string(&standards).map_err(|e| format!("序列化失败: {}", e))
}

/// 查询单个物料定额
#[tauri::command(rename_all = "snake_case")]
pub async fn get_material_standard(
    state: tauri::State<'_, AppState>,
    standard_id: String,
) -> Result<String, String> {
    let standard = state
        .catalog_api
        .get_material_standard(&standard_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&standard).map_err(|e| format!("序列化失败: {}", e))
}

/// 保存物料定额
#[tauri::command(rename_all = "snake_case")]
pub async fn save_material_standard(
    state: tauri::State<'_, AppState>,
    standard: String,
) -> Result<String, String> {
    let standard: MaterialStandard =
        serde_json::from_str(&standard).map_err(|e| format!("物料定额解析失败: {}", e))?;

    state
        .catalog_api
        .save_material_standard(&standard)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}

/// 查询全部加工流程
#[tauri::command(rename_all = "snake_case")]
pub async fn list_process_flows(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let flows = state.catalog_api.list_process_flows().map_err(map_api_error)?;

    serde_json::to_string(&flows).map_err(|e| format!("序列化失败: {}", e))
}

/// 保存加工流程
#[tauri::command(rename_all = "snake_case")]
pub async fn save_process_flow(
    state: tauri::State<'_, AppState>,
    flow: String,
) -> Result<String, String> {
    let flow: ProcessFlow =
        serde_json::from_str(&flow).map_err(|e| format!("加工流程解析失败: {}", e))?;

    state.catalog_api.save_process_flow(&flow).map_err(map_api_error)?;

    Ok("{}".to_string())
}

/// 按类别查询费用目录
#[tauri::command(rename_all = "snake_case")]
pub async fn list_cost_catalog(
    state: tauri::State<'_, AppState>,
    kind: Option<String>,
) -> Result<String, String> {
    let items = state
        .catalog_api
        .list_cost_catalog(kind.as_deref())
        .map_err(map_api_error)?;

    serde_json::to_string(&items).map_err(|e| format!("序列化失败: {}", e))
}

/// 保存费用目录项
#[tauri::command(rename_all = "snake_case")]
pub async fn save_cost_catalog_item(
    state: tauri::State<'_, AppState>,
    item: String,
) -> Result<String, String> {
    let item: CostCatalogItem =
        serde_json::from_str(&item).map_err(|e| format!("费用项解析失败: {}", e))?;

    state
        .catalog_api
        .save_cost_catalog_item(&item)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}
