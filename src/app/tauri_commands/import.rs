use crate::app::state::AppState;

// ==========================================
// 费用目录导入相关命令
// ==========================================

/// 从 Excel/CSV 导入费用目录
#[tauri::command(rename_all = "snake_case")]
pub async fn import_cost_catalog(
    state: tauri::State<'_, AppState>,
    file_path: String,
) -> Result<String, String> {
    let summary = state
        .cost_catalog_importer
        .import_file(&file_path)
        .map_err(|e| e.to_string())?;

    serde_json::to_string(&summary).map_err(|e| format!("序列化失败: {}", e))
}
