// ==========================================
// Merchify 动态降价引擎 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv, 分隔符 , 或 ; 自动识别) / Excel (.xlsx/.xls)
// 输出: 表头 + 行记录（列名 → 原始文本），空白行跳过
// ==========================================

use crate::importer::article_importer_trait::{FileParser, RawRow, RawTable};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

fn build_row(headers: &[String], cells: impl Iterator<Item = String>, row_number: usize) -> Option<RawRow> {
    let mut values = HashMap::new();
    for (header, value) in headers.iter().zip(cells) {
        if header.is_empty() {
            continue;
        }
        values.insert(header.clone(), value.trim().to_string());
    }

    // 跳过完全空白的行
    if values.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(RawRow { row_number, values })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 按首行识别分隔符（德语 Excel 导出常用 ;）
    pub fn sniff_delimiter(content: &str) -> u8 {
        let first_line = content.lines().next().unwrap_or("");
        let commas = first_line.matches(',').count();
        let semicolons = first_line.matches(';').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }

    /// 解析 CSV 文本
    pub fn parse_str(&self, content: &str) -> ImportResult<RawTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(Self::sniff_delimiter(content))
            .flexible(true) // 允许行长度不一致
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            if let Some(row) = build_row(&headers, record.iter().map(str::to_string), row_number) {
                rows.push(row);
            }
        }

        Ok(RawTable { headers, rows })
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let content = fs::read_to_string(file_path)?;
        self.parse_str(&content)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// 单元格 → 文本；日期单元格转为 YYYY-MM-DD
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
            other => other.to_string(),
        }
    }
}

/// Excel 序列日期（1900 日期系统）→ NaiveDate
///
/// 非有限值或超出 chrono 可表示范围时返回 None，由调用方保留原始数值
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.trunc() as i64)?)
}

impl FileParser for ExcelParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut data_rows = range.rows();
        let header_row = data_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| clean_header(&Self::cell_to_string(cell)))
            .collect();

        let mut rows = Vec::new();
        for (idx, data_row) in data_rows.enumerate() {
            let cells = data_row.iter().map(Self::cell_to_string);
            if let Some(row) = build_row(&headers, cells, idx + 2) {
                rows.push(row);
            }
        }

        Ok(RawTable { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_to_raw_table(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_table(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_csv_parser_comma() {
        let file = csv_file("SKU,Kategorie,KW\nA-1,Jacken,7\nA-2,Hosen,8\n");
        let table = CsvParser.parse_to_raw_table(file.path()).unwrap();

        assert_eq!(table.headers, vec!["SKU", "Kategorie", "KW"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].values.get("SKU"), Some(&"A-1".to_string()));
        assert_eq!(table.rows[0].row_number, 2);
    }

    #[test]
    fn test_csv_parser_semicolon_and_bom() {
        let file = csv_file("\u{feff}SKU;Verkäufe\nA-1;12,5\n");
        let table = CsvParser.parse_to_raw_table(file.path()).unwrap();

        assert_eq!(table.headers, vec!["SKU", "Verkäufe"]);
        assert_eq!(table.rows[0].values.get("Verkäufe"), Some(&"12,5".to_string()));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let file = csv_file("SKU,Verkäufe\nA-1,2\n,\nA-2,3\n");
        let table = CsvParser.parse_to_raw_table(file.path()).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].row_number, 4);
    }

    #[test]
    fn test_file_not_found() {
        let result = UniversalFileParser.parse_to_raw_table(Path::new("missing.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let result = UniversalFileParser.parse_to_raw_table(Path::new("data.json"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_excel_serial_date() {
        assert_eq!(
            excel_serial_to_date(45677.0),
            NaiveDate::from_ymd_opt(2025, 1, 20)
        );
    }

    #[test]
    fn test_excel_serial_out_of_range() {
        assert_eq!(excel_serial_to_date(1e300), None);
        assert_eq!(excel_serial_to_date(-1e300), None);
        assert_eq!(excel_serial_to_date(1e15), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(f64::INFINITY), None);
    }
}
