// ==========================================
// Merchify 动态降价引擎 - 数据质量校验器实现
// ==========================================
// 职责: 行级 DQ 校验 + DQ 报告生成
// 级别: ERROR 阻断该行 / WARNING 参与计算 / INFO 仅记录
// ==========================================

use crate::config::season_table::MAX_ISO_WEEK;
use crate::domain::article::{
    ArticleRecord, DqLevel, DqReport, DqSummary, DqViolation, RawArticleRecord,
};
use crate::engine::period::PeriodResolver;
use crate::importer::article_importer_trait::DqValidator as DqValidatorTrait;
use std::collections::HashSet;

pub struct DqValidator;

impl DqValidator {
    fn violation(
        record: &RawArticleRecord,
        level: DqLevel,
        field: &str,
        message: String,
    ) -> DqViolation {
        DqViolation {
            row_number: record.row_number,
            article_id: record.article_id.clone(),
            level,
            field: field.to_string(),
            message,
        }
    }

    /// 必填字段
    fn validate_required_fields(&self, record: &RawArticleRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        if record.article_id.is_none() {
            violations.push(Self::violation(record, DqLevel::Error, "article_id", "商品号缺失".to_string()));
        }
        if record.category.is_none() {
            violations.push(Self::violation(record, DqLevel::Error, "category", "品类缺失，无法查找目标周转".to_string()));
        }
        if record.stock_on_hand.is_none() {
            violations.push(Self::violation(record, DqLevel::Error, "stock_on_hand", "库存缺失".to_string()));
        }
        if record.sales_qty.is_none() {
            violations.push(Self::violation(record, DqLevel::Error, "sales_qty", "销量缺失".to_string()));
        }
        if record.week.is_none() && record.date.is_none() {
            violations.push(Self::violation(record, DqLevel::Error, "week|date", "KW 与日期均缺失".to_string()));
        }

        violations
    }

    /// 数值范围
    fn validate_ranges(&self, record: &RawArticleRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        if let Some(stock) = record.stock_on_hand {
            if !stock.is_finite() {
                violations.push(Self::violation(record, DqLevel::Error, "stock_on_hand", format!("库存不是有限数值: {}", stock)));
            } else if stock < 0.0 {
                violations.push(Self::violation(record, DqLevel::Error, "stock_on_hand", format!("库存为负数: {}", stock)));
            }
        }

        if let Some(sales) = record.sales_qty {
            if !sales.is_finite() {
                violations.push(Self::violation(record, DqLevel::Error, "sales_qty", format!("销量不是有限数值: {}", sales)));
            } else if sales < 0.0 {
                violations.push(Self::violation(record, DqLevel::Error, "sales_qty", format!("销量为负数: {}", sales)));
            }
        }

        let year_in_range = match record.year {
            Some(year) if !(1900..=9999).contains(&year) => {
                violations.push(Self::violation(record, DqLevel::Error, "year", format!("年份超出范围: {}", year)));
                None
            }
            other => other,
        };

        if let Some(week) = record.week {
            if !(1..=MAX_ISO_WEEK).contains(&week) {
                violations.push(Self::violation(record, DqLevel::Error, "week", format!("KW 超出 1..=53: {}", week)));
            } else if let Some(year) = year_in_range {
                // 只有 52 周的年份不存在 KW53
                let weeks = PeriodResolver::iso_weeks_in_year(year);
                if week > weeks {
                    violations.push(Self::violation(
                        record,
                        DqLevel::Error,
                        "week",
                        format!("KW{} 不存在于 {} 年 (该年共 {} 周)", week, year, weeks),
                    ));
                }
            }
        }

        violations
    }

    /// 价格字段（只影响展示，不阻断）
    fn validate_prices(&self, record: &RawArticleRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        match record.unit_price {
            None => violations.push(Self::violation(
                record,
                DqLevel::Info,
                "unit_price",
                "单价缺失，不计算降价后价格".to_string(),
            )),
            Some(price) if price < 0.0 => violations.push(Self::violation(
                record,
                DqLevel::Warning,
                "unit_price",
                format!("单价为负数: {}", price),
            )),
            Some(_) => {}
        }

        if let Some(cost) = record.unit_cost {
            if cost < 0.0 {
                violations.push(Self::violation(record, DqLevel::Warning, "unit_cost", format!("成本为负数: {}", cost)));
            }
        }

        if let (Some(price), Some(cost)) = (record.unit_price, record.unit_cost) {
            if price < cost {
                violations.push(Self::violation(
                    record,
                    DqLevel::Warning,
                    "unit_price,unit_cost",
                    format!("单价低于成本 ({:.2} < {:.2})", price, cost),
                ));
            }
        }

        violations
    }
}

impl DqValidator {
    /// 校验已类型化的内存记录
    ///
    /// 年份按 `week_key` 的优先级补全（含 default_year），
    /// 因此回退得到的年份同样参与 KW53 检查
    pub fn validate_article(
        &self,
        record: &ArticleRecord,
        default_year: Option<i32>,
    ) -> Vec<DqViolation> {
        let year = match record.week {
            Some(_) => record.week_key(default_year).and_then(|key| key.year),
            None => record.year,
        };
        let raw = RawArticleRecord {
            article_id: Some(record.article_id.clone()).filter(|s| !s.trim().is_empty()),
            category: Some(record.category.clone()).filter(|s| !s.trim().is_empty()),
            year,
            week: record.week,
            date: record.date,
            stock_on_hand: Some(record.stock_on_hand),
            sales_qty: Some(record.sales_qty),
            unit_price: record.unit_price,
            unit_cost: record.unit_cost,
            row_number: record.row_number,
        };

        let mut violations = self.validate_required_fields(&raw);
        violations.extend(self.validate_ranges(&raw));
        violations
    }

    /// 批量校验内存记录，返回含 ERROR 的行号（升序去重）
    pub fn blocked_rows(&self, records: &[ArticleRecord], default_year: Option<i32>) -> Vec<usize> {
        let mut rows: Vec<usize> = records
            .iter()
            .filter(|record| {
                self.validate_article(record, default_year)
                    .iter()
                    .any(|v| v.level == DqLevel::Error)
            })
            .map(|record| record.row_number)
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}

impl DqValidatorTrait for DqValidator {
    fn validate_record(&self, record: &RawArticleRecord) -> Vec<DqViolation> {
        let mut violations = self.validate_required_fields(record);
        violations.extend(self.validate_ranges(record));
        violations.extend(self.validate_prices(record));
        violations
    }

    fn generate_dq_report(
        &self,
        batch_id: String,
        total_rows: usize,
        violations: Vec<DqViolation>,
    ) -> DqReport {
        let blocked_rows: HashSet<usize> = violations
            .iter()
            .filter(|v| v.level == DqLevel::Error)
            .map(|v| v.row_number)
            .collect();
        let warning = violations
            .iter()
            .filter(|v| v.level == DqLevel::Warning)
            .count();
        let info = violations
            .iter()
            .filter(|v| v.level == DqLevel::Info)
            .count();

        DqReport {
            batch_id,
            summary: DqSummary {
                total_rows,
                accepted: total_rows.saturating_sub(blocked_rows.len()),
                blocked: blocked_rows.len(),
                warning,
                info,
            },
            violations,
        }
    }
}
