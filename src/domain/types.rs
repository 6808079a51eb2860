// ==========================================
// 报价成本核算系统 - 领域类型定义
// ==========================================
// 职责: 核算引擎与报价记录共用的基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 产品标识 (Product Key)
// ==========================================
// 费用组选择集的成员标识。
// 区分普通产品行（按核算单内序号定位）与附加费用行（按稳定 uuid 定位），
// 分摊逻辑不解析字符串标识。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductKey {
    /// 普通产品行（对应报价请求行），index 为核算单 products 中的序号
    Product { index: usize },
    /// 附加费用行（无对应请求行），id 为行创建时分配的 uuid
    Additional { id: String },
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKey::Product { index } => write!(f, "P{}", index),
            ProductKey::Additional { id } => write!(f, "A:{}", id),
        }
    }
}

// ==========================================
// 费用类别 (Cost Kind)
// ==========================================
// 费用目录分为一般费用（按费用组显式选择分摊）与出口费用（隐式全员分摊）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostKind {
    General, // 一般费用
    Export,  // 出口费用
}

impl fmt::Display for CostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostKind::General => write!(f, "GENERAL"),
            CostKind::Export => write!(f, "EXPORT"),
        }
    }
}

impl CostKind {
    /// 从字符串解析费用类别
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "EXPORT" => CostKind::Export,
            _ => CostKind::General, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CostKind::General => "GENERAL",
            CostKind::Export => "EXPORT",
        }
    }
}

// ==========================================
// 报价状态 (Quotation Status)
// ==========================================
// promote 生成正式报价记录时由调用方指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotationStatus {
    Draft,    // 草稿
    Sent,     // 已发送
    Accepted, // 已接受
    Rejected, // 已拒绝
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotationStatus::Draft => write!(f, "DRAFT"),
            QuotationStatus::Sent => write!(f, "SENT"),
            QuotationStatus::Accepted => write!(f, "ACCEPTED"),
            QuotationStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl QuotationStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SENT" => QuotationStatus::Sent,
            "ACCEPTED" => QuotationStatus::Accepted,
            "REJECTED" => QuotationStatus::Rejected,
            _ => QuotationStatus::Draft, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "DRAFT",
            QuotationStatus::Sent => "SENT",
            QuotationStatus::Accepted => "ACCEPTED",
            QuotationStatus::Rejected => "REJECTED",
        }
    }
}
