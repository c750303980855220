// ==========================================
// Merchify 动态降价引擎 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段 + 类型转换
// 列名匹配: 去首尾空白、忽略大小写；每个字段可配置多个别名
// ==========================================

use crate::domain::article::RawArticleRecord;
use crate::importer::article_importer_trait::{DataCleaner as _, FieldMapper as FieldMapperTrait, RawRow};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ==========================================
// ColumnMapping - 列映射配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub article_id: Vec<String>,
    pub category: Vec<String>,
    pub year: Vec<String>,
    pub week: Vec<String>,
    pub date: Vec<String>,
    pub stock_on_hand: Vec<String>,
    pub sales_qty: Vec<String>,
    pub unit_price: Vec<String>,
    pub unit_cost: Vec<String>,
}

impl Default for ColumnMapping {
    /// 德语 POS 导出列名 + 英文列名
    fn default() -> Self {
        Self {
            article_id: aliases(&["SKU", "Artikelnummer", "Artikel", "article_id", "article"]),
            category: aliases(&["Kategorie", "Warengruppe", "category"]),
            year: aliases(&["Jahr", "year"]),
            week: aliases(&["Kalenderwoche", "KW", "week", "calendar_week"]),
            date: aliases(&["Datum", "date"]),
            stock_on_hand: aliases(&["Lagerbestand", "Bestand", "stock_on_hand", "stock"]),
            sales_qty: aliases(&["Verkäufe", "Absatz", "sales_qty", "sales"]),
            unit_price: aliases(&["Preis", "Verkaufspreis", "unit_price", "price"]),
            unit_cost: aliases(&["Einkaufspreis", "unit_cost", "cost"]),
        }
    }
}

impl ColumnMapping {
    /// 在表头中查找字段对应的实际列名
    pub fn find_column<'h>(candidates: &[String], headers: &'h [String]) -> Option<&'h String> {
        candidates.iter().find_map(|alias| {
            let wanted = alias.trim().to_lowercase();
            headers.iter().find(|h| h.trim().to_lowercase() == wanted)
        })
    }

    /// 缺失的必需字段名
    ///
    /// 必需: 商品号、品类、库存、销量，以及 KW/日期至少一个
    pub fn missing_required(&self, headers: &[String]) -> Vec<String> {
        let mut missing = Vec::new();
        let required = [
            ("article_id", &self.article_id),
            ("category", &self.category),
            ("stock_on_hand", &self.stock_on_hand),
            ("sales_qty", &self.sales_qty),
        ];
        for (field, candidates) in required {
            if Self::find_column(candidates, headers).is_none() {
                missing.push(field.to_string());
            }
        }

        if Self::find_column(&self.week, headers).is_none()
            && Self::find_column(&self.date, headers).is_none()
        {
            missing.push("week|date".to_string());
        }

        missing
    }
}

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
pub struct FieldMapper {
    mapping: ColumnMapping,
    cleaner: DataCleaner,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(ColumnMapping::default())
    }
}

impl FieldMapper {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self {
            mapping,
            cleaner: DataCleaner,
        }
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// 提取字符串字段（按别名顺序，空白视为缺失）
    fn get_string(&self, row: &RawRow, candidates: &[String]) -> Option<String> {
        candidates.iter().find_map(|alias| {
            let wanted = alias.trim().to_lowercase();
            row.values
                .iter()
                .find(|(k, _)| k.trim().to_lowercase() == wanted)
                .and_then(|(_, v)| self.cleaner.normalize_null(Some(v)))
        })
    }

    fn parse_f64(&self, row: &RawRow, candidates: &[String], field: &str) -> ImportResult<Option<f64>> {
        match self.get_string(row, candidates) {
            None => Ok(None),
            Some(value) => self
                .cleaner
                .parse_number(&value)
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row.row_number,
                    field: field.to_string(),
                    message: format!("无法解析为数值: {}", value),
                }),
        }
    }

    fn parse_int(&self, row: &RawRow, candidates: &[String], field: &str) -> ImportResult<Option<i64>> {
        match self.get_string(row, candidates) {
            None => Ok(None),
            Some(value) => self
                .cleaner
                .parse_integer(&value)
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row.row_number,
                    field: field.to_string(),
                    message: format!("无法解析为整数: {}", value),
                }),
        }
    }

    fn parse_date(&self, row: &RawRow, candidates: &[String], field: &str) -> ImportResult<Option<NaiveDate>> {
        match self.get_string(row, candidates) {
            None => Ok(None),
            Some(value) => self
                .cleaner
                .parse_date(&value)
                .map(Some)
                .ok_or_else(|| ImportError::DateFormatError {
                    row: row.row_number,
                    field: field.to_string(),
                    value,
                }),
        }
    }
}

impl FieldMapperTrait for FieldMapper {
    fn check_columns(&self, headers: &[String]) -> ImportResult<()> {
        let missing = self.mapping.missing_required(headers);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MissingColumns { missing })
        }
    }

    fn map_to_raw_article(&self, row: &RawRow) -> ImportResult<RawArticleRecord> {
        let m = &self.mapping;

        let year = self
            .parse_int(row, &m.year, "year")?
            .map(|y| {
                i32::try_from(y).map_err(|_| ImportError::TypeConversionError {
                    row: row.row_number,
                    field: "year".to_string(),
                    message: format!("年份超出范围: {}", y),
                })
            })
            .transpose()?;

        // KW 负数/超大值交给 DQ 校验报告，这里只做类型转换
        let week = self
            .parse_int(row, &m.week, "week")?
            .map(|w| u32::try_from(w).unwrap_or(0));

        Ok(RawArticleRecord {
            article_id: self.get_string(row, &m.article_id),
            category: self.get_string(row, &m.category),
            year,
            week,
            date: self.parse_date(row, &m.date, "date")?,
            stock_on_hand: self.parse_f64(row, &m.stock_on_hand, "stock_on_hand")?,
            sales_qty: self.parse_f64(row, &m.sales_qty, "sales_qty")?,
            unit_price: self.parse_f64(row, &m.unit_price, "unit_price")?,
            unit_cost: self.parse_f64(row, &m.unit_cost, "unit_cost")?,
            row_number: row.row_number,
        })
    }
}
