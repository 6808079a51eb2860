// ==========================================
// 报价成本核算系统 - 报价请求与正式报价
// ==========================================
// 职责: 报价请求（核算单的来源）与 promote 产出的正式报价记录
// ==========================================

use crate::domain::types::QuotationStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// QuotationRequest - 报价请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationRequest {
    pub request_id: String,
    pub request_code: String,
    pub customer_name: Option<String>,
    pub created_at: NaiveDateTime,
}

/// 报价请求行：一个待报价的产出产品
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationRequestLine {
    pub line_id: String,
    pub request_id: String,
    pub product_ref: Option<String>,
    pub product_name: String,
    pub quantity: f64,
    pub unit: String,
    pub sort_order: i32,
}

// ==========================================
// Quotation - 正式报价记录
// ==========================================
/// 由核算单 promote 生成的正式报价记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    pub quotation_id: String,
    pub request_id: String,
    pub quote_code: String,
    pub status: QuotationStatus,
    /// 报价有效期（天）
    pub validity_days: i32,
    pub notes: Option<String>,
    /// promote 时刻核算得到的预期营收
    pub expected_revenue: f64,
    pub created_at: NaiveDateTime,
}
