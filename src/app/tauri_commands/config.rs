use crate::app::state::AppState;

use super::common::map_api_error;

// ==========================================
// 配置管理相关命令
// ==========================================

/// 查询所有配置
#[tauri::command(rename_all = "snake_case")]
pub async fn list_configs(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let result = state.config_api.list_configs().map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 查询单个配置
#[tauri::command(rename_all = "snake_case")]
pub async fn get_config(
    state: tauri::State<'_, AppState>,
    key: String,
) -> Result<String, String> {
    let result = state.config_api.get_config(&key).map_err(map_api_error)?;

    serde_json::to_string(&result).map_err(|e| format!("序列化失败: {}", e))
}

/// 更新配置
#[tauri::command(rename_all = "snake_case")]
pub async fn update_config(
    state: tauri::State<'_, AppState>,
    key: String,
    value: String,
) -> Result<String, String> {
    state
        .config_api
        .set_config(&key, &value)
        .map_err(map_api_error)?;

    Ok("{}".to_string())
}
