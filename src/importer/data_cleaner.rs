// ==========================================
// Merchify 动态降价引擎 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 小数逗号 / 日期格式
// ==========================================

use crate::importer::article_importer_trait::DataCleaner as DataCleanerTrait;
use chrono::NaiveDate;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%Y%m%d"];

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_number(&self, value: &str) -> Option<f64> {
        let compact: String = value
            .trim()
            .trim_end_matches('€')
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if compact.is_empty() {
            return None;
        }

        let normalized = match (compact.rfind(','), compact.rfind('.')) {
            // "1.234,5" → 逗号是小数点
            (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
            // "1,234.5" → 逗号是千分位
            (Some(_), Some(_)) => compact.replace(',', ""),
            (Some(_), None) if compact.matches(',').count() == 1 => compact.replace(',', "."),
            (Some(_), None) => compact.replace(',', ""),
            _ => compact,
        };

        normalized.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        // Excel 导出可能带时间部分
        let date_part = value.split_whitespace().next()?;
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
    }
}

impl DataCleaner {
    /// 整数解析（允许 "7.0"，拒绝 "7.5"）
    pub fn parse_integer(&self, value: &str) -> Option<i64> {
        let number = self.parse_number(value)?;
        if number.fract() != 0.0 {
            return None;
        }
        Some(number as i64)
    }
}
