// ==========================================
// 报价成本核算系统 - 文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 表头 -> 单元格文本 的行映射, 空白行跳过
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 按扩展名自动选择解析器
pub fn parse_file<P: AsRef<Path>>(file_path: P) -> ImportResult<Vec<HashMap<String, String>>> {
    let path = file_path.as_ref();
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => parse_csv(path),
        "xlsx" | "xls" => parse_xlsx(path),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

/// 解析 CSV 文件为原始记录
pub fn parse_csv(path: &Path) -> ImportResult<Vec<HashMap<String, String>>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row_map = HashMap::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), value.trim().to_string());
            }
        }

        // 跳过完全空白的行
        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

/// 解析 Excel 文件第一个工作表为原始记录
pub fn parse_xlsx(path: &Path) -> ImportResult<Vec<HashMap<String, String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
    }

    let sheet_name = sheet_names[0].clone();
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for data_row in rows {
        let mut row_map = HashMap::new();

        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), cell.to_string().trim().to_string());
            }
        }

        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(f, "{}", line).unwrap();
        }
        f
    }

    #[test]
    fn test_parse_csv_valid_file() {
        let f = csv_file(&["费用名称,单位,类别", "海运费,USD,EXPORT", "电费,VND,GENERAL"]);
        let records = parse_file(f.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("费用名称"), Some(&"海运费".to_string()));
        assert_eq!(records[1].get("类别"), Some(&"GENERAL".to_string()));
    }

    #[test]
    fn test_parse_csv_skip_empty_rows() {
        let f = csv_file(&["费用名称,单位", "海运费,USD", ",", "电费,VND"]);
        let records = parse_file(f.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_file_not_found() {
        let result = parse_file("non_existent.csv");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_file_unsupported_format() {
        let mut f = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(f, "内容").unwrap();
        let result = parse_file(f.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
