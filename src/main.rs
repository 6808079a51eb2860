// ==========================================
// 报价成本核算系统 - Tauri 主入口
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// 系统定位: 报价成本核算与利润测算
// ==========================================

// 禁止控制台窗口 (Windows)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(feature = "tauri-app")]
fn main() {
    use quotation_costing::app::tauri_commands::*;
    use quotation_costing::app::{get_default_db_path, AppState};

    // 初始化日志系统
    quotation_costing::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", quotation_costing::APP_NAME);
    tracing::info!("系统版本: {}", quotation_costing::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path).expect("无法初始化AppState");

    tracing::info!("AppState初始化成功, 启动Tauri应用...");

    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ==========================================
            // 核算单相关命令 (6个)
            // ==========================================
            open_calculation,
            recompute_calculation,
            save_calculation,
            delete_calculation,
            promote_quotation,
            list_quotations,
            // ==========================================
            // 目录维护相关命令 (7个)
            // ==========================================
            list_material_standards,
            get_material_standard,
            save_material_standard,
            list_process_flows,
            save_process_flow,
            list_cost_catalog,
            save_cost_catalog_item,
            // ==========================================
            // 配置管理相关命令 (3个)
            // ==========================================
            list_configs,
            get_config,
            update_config,
            // ==========================================
            // 费用目录导入相关命令 (1个)
            // ==========================================
            import_cost_catalog,
        ])
        .run(tauri::generate_context!())
        .expect("启动Tauri应用失败");

    tracing::info!("Tauri应用已退出");
}

#[cfg(not(feature = "tauri-app"))]
fn main() {
    println!("==================================================");
    println!("{}", quotation_costing::APP_NAME);
    println!("系统版本: {}", quotation_costing::VERSION);
    println!("==================================================");
    println!();
    println!("此可执行文件需要启用 tauri-app 特性");
    println!("使用: cargo run --features tauri-app");
    println!();
    println!("或者使用库模式:");
    println!("use quotation_costing::app::AppState;");
}
