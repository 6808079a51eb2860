// ==========================================
// 报价成本核算系统 - 费用目录导入器
// ==========================================
// 职责: 从 Excel/CSV 导入费用目录（名称/单位/类别）
// 策略: 按 (名称, 类别) 去重, 已存在则更新单位, 保留原 item_id
// ==========================================

use crate::domain::catalog::CostCatalogItem;
use crate::domain::types::CostKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::parse_file;
use crate::repository::CatalogRepository;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

// 列名别名（中文表头优先, 兼容英文导出件）
const NAME_COLUMNS: &[&str] = &["费用名称", "名称", "item_name", "name"];
const UNIT_COLUMNS: &[&str] = &["单位", "币种", "unit"];
const KIND_COLUMNS: &[&str] = &["类别", "费用类别", "kind"];

/// 导入结果汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

pub struct CostCatalogImporter {
    catalog_repo: Arc<CatalogRepository>,
}

impl CostCatalogImporter {
    pub fn new(catalog_repo: Arc<CatalogRepository>) -> Self {
        Self { catalog_repo }
    }

    /// 从文件导入费用目录
    ///
    /// 单行错误不中断整体导入, 记入 errors 后继续
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportSummary> {
        let records = parse_file(file_path)?;

        // 必填列校验（对首行表头做一次）
        if let Some(first) = records.first() {
            find_column(first, NAME_COLUMNS)
                .ok_or_else(|| ImportError::MissingColumn(NAME_COLUMNS[0].to_string()))?;
        }

        let mut summary = ImportSummary {
            total_rows: records.len(),
            inserted: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
        };

        for (idx, row) in records.iter().enumerate() {
            let row_no = idx + 2; // 表头占第 1 行
            match self.import_row(row) {
                Ok(RowOutcome::Inserted) => summary.inserted += 1,
                Ok(RowOutcome::Updated) => summary.updated += 1,
                Ok(RowOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    summary.skipped += 1;
                    summary.errors.push(format!("行 {}: {}", row_no, e));
                }
            }
        }

        tracing::info!(
            total = summary.total_rows,
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = summary.skipped,
            "费用目录导入完成"
        );

        Ok(summary)
    }

    fn import_row(&self, row: &HashMap<String, String>) -> ImportResult<RowOutcome> {
        let item_name = match read_column(row, NAME_COLUMNS) {
            Some(name) => name,
            None => return Ok(RowOutcome::Skipped), // 名称为空的行直接跳过
        };
        let unit = read_column(row, UNIT_COLUMNS).unwrap_or_default();
        let kind = read_column(row, KIND_COLUMNS)
            .map(|s| parse_kind(&s))
            .transpose()?
            .unwrap_or(CostKind::General);

        match self.catalog_repo.find_cost_catalog_by_name(&item_name, kind)? {
            Some(existing) => {
                if existing.unit == unit {
                    return Ok(RowOutcome::Skipped);
                }
                self.catalog_repo.upsert_cost_catalog_item(&CostCatalogItem {
                    item_id: existing.item_id,
                    item_name,
                    unit,
                    kind,
                })?;
                Ok(RowOutcome::Updated)
            }
            None => {
                self.catalog_repo.upsert_cost_catalog_item(&CostCatalogItem {
                    item_id: Uuid::new_v4().to_string(),
                    item_name,
                    unit,
                    kind,
                })?;
                Ok(RowOutcome::Inserted)
            }
        }
    }
}

enum RowOutcome {
    Inserted,
    Updated,
    Skipped,
}

/// 在行映射里按别名表找到列名
fn find_column<'a>(row: &'a HashMap<String, String>, aliases: &[&'a str]) -> Option<&'a str> {
    aliases
        .iter()
        .find(|alias| row.contains_key(**alias))
        .copied()
}

/// 按别名表读取单元格文本（空串视为缺失）
fn read_column(row: &HashMap<String, String>, aliases: &[&str]) -> Option<String> {
    let column = find_column(row, aliases)?;
    let value = row.get(column)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_kind(value: &str) -> ImportResult<CostKind> {
    match value.trim().to_uppercase().as_str() {
        "GENERAL" | "一般" | "一般费用" => Ok(CostKind::General),
        "EXPORT" | "出口" | "出口费用" => Ok(CostKind::Export),
        other => Err(ImportError::InvalidValue {
            row: 0,
            column: KIND_COLUMNS[0].to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_read_column_aliases() {
        let r = row(&[("名称", "海运费"), ("单位", "USD")]);
        assert_eq!(read_column(&r, NAME_COLUMNS), Some("海运费".to_string()));
        assert_eq!(read_column(&r, UNIT_COLUMNS), Some("USD".to_string()));
        assert_eq!(read_column(&r, KIND_COLUMNS), None);
    }

    #[test]
    fn test_parse_kind_accepts_chinese_labels() {
        assert_eq!(parse_kind("出口费用").unwrap(), CostKind::Export);
        assert_eq!(parse_kind("general").unwrap(), CostKind::General);
        assert!(parse_kind("未知").is_err());
    }
}
