// ==========================================
// 报价成本核算系统 - 应用层
// ==========================================
// 职责: 应用状态与 Tauri 命令
// ==========================================

pub mod state;
pub mod tauri_commands;

pub use state::{get_default_db_path, AppState};
