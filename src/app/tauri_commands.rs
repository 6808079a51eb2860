// ==========================================
// 报价成本核算系统 - Tauri 命令（按域拆分）
// ==========================================
// 职责: Tauri 命令定义,连接前端与后端 API
// ==========================================

#![cfg(feature = "tauri-app")]

mod catalog;
mod common;
mod config;
mod costing;
mod import;

pub use catalog::*;
pub use config::*;
pub use costing::*;
pub use import::*;
