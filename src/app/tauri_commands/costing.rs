use crate::app::state::AppState;
use crate::domain::calculation::CalculationDocument;

use super::common::map_api_error;

// ==========================================
// 核算单相关命令
// ==========================================

/// 打开核算单（不存在则从报价请求新建）
#[tauri::command(rename_all = "snake_case")]
pub async fn open_calculation(
    state: tauri::State<'_, AppState>,
    quotation_request_id: String,
) -> Result<String, String> {
    let view = state
        .costing_api
        .open_calculation(&quotation_request_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&view).map_err(|e| format!("序列化失败: {}", e))
}

/// 重算核算单（不落库, 前端编辑后调用）
#[tauri::command(rename_all = "snake_case")]
pub async fn recompute_calculation(
    state: tauri::State<'_, AppState>,
    document: String,
) -> Result<String, String> {
    let document: CalculationDocument =
        serde_json::from_str(&document).map_err(|e| format!("核算单解析失败: {}", e))?;

    let view = state.costing_api.recompute(document).map_err(map_api_error)?;

    serde_json::to_string(&view).map_err(|e| format!("序列化失败: {}", e))
}

/// 保存核算单（整单替换）
#[tauri::command(rename_all = "snake_case")]
pub async fn save_calculation(
    state: tauri::State<'_, AppState>,
    document: String,
) -> Result<String, String> {
    let document: CalculationDocument =
        serde_json::from_str(&document).map_err(|e| format!("核算单解析失败: {}", e))?;

    let view = state
        .costing_api
        .save_calculation(document)
        .map_err(map_api_error)?;

    serde_json::to_string(&view).map_err(|e| format!("序列化失败: {}", e))
}

/// 删除核算单
#[tauri::command(rename_all = "snake_case")]
pub async fn delete_calculation(
    state: tauri::State<'_, AppState>,
    quotation_request_id: String,
) -> Result<String, String> {
    let deleted = state
        .costing_api
        .delete_calculation(&quotation_request_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&deleted).map_err(|e| format!("序列化失败: {}", e))
}

/// 升级为正式报价记录
#[tauri::command(rename_all = "snake_case")]
pub async fn promote_quotation(
    state: tauri::State<'_, AppState>,
    quotation_request_id: String,
    validity_days: Option<i32>,
    status: String,
    notes: Option<String>,
) -> Result<String, String> {
    let quotation = state
        .costing_api
        .promote(&quotation_request_id, validity_days, &status, notes)
        .map_err(map_api_error)?;

    serde_json::to_string(&quotation).map_err(|e| format!("序列化失败: {}", e))
}

/// 查询请求名下的正式报价记录
#[tauri::command(rename_all = "snake_case")]
pub async fn list_quotations(
    state: tauri::State<'_, AppState>,
    quotation_request_id: String,
) -> Result<String, String> {
    let quotations = state
        .costing_api
        .list_quotations(&quotation_request_id)
        .map_err(map_api_error)?;

    serde_json::to_string(&quotations).map_err(|e| format!("序列化失败: {}", e))
}
