// ==========================================
// Merchify 动态降价引擎 - 批次导出
// ==========================================
// 职责: AnalysisBatch → CSV
// 规则: 周转只在导出时取一位小数；无定义值写 "undefined"
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::decision::{AnalysisBatch, AnnotatedArticle, ResolvedPeriod};
use crate::domain::types::Period;
use crate::i18n::season_label;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const UNDEFINED: &str = "undefined";

/// 导出列（输入列 + 计算列）
pub const EXPORT_HEADERS: [&str; 22] = [
    "article_id",
    "category",
    "year",
    "week",
    "date",
    "stock_on_hand",
    "sales_qty",
    "unit_price",
    "unit_cost",
    "sales_rate",
    "weeks_of_coverage",
    "period",
    "period_year",
    "target_coverage",
    "target_source",
    "decision",
    "tier",
    "discount_pct",
    "metric",
    "markdown_price",
    "margin_pct_after",
    "forecast_sales",
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_2dp(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

// ==========================================
// CsvExporter - CSV 导出器
// ==========================================
pub struct CsvExporter {
    delimiter: u8,
    localized_labels: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: b',',
            localized_labels: false,
        }
    }
}

impl CsvExporter {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// tier 列与季节期间列使用当前语言的展示标签
    ///
    /// 月份期间仍输出查表键，便于回填配置
    pub fn with_localized_labels(mut self, localized: bool) -> Self {
        self.localized_labels = localized;
        self
    }

    fn period_field(&self, period: Option<ResolvedPeriod>) -> String {
        match period.map(|p| p.period) {
            Some(Period::Season(season)) if self.localized_labels => season_label(season),
            Some(p) => p.key().to_string(),
            None => String::new(),
        }
    }

    fn row_fields(&self, row: &AnnotatedArticle) -> Vec<String> {
        let r = &row.record;
        let d = &row.decision;

        let tier = if self.localized_labels {
            d.display_label()
        } else {
            d.label().to_string()
        };

        vec![
            r.article_id.clone(),
            r.category.clone(),
            opt(r.year),
            opt(r.week),
            opt(r.date),
            r.stock_on_hand.to_string(),
            r.sales_qty.to_string(),
            opt(r.unit_price),
            opt(r.unit_cost),
            format!("{:.2}", row.sales_rate),
            row.coverage.to_string(),
            self.period_field(row.resolved_period),
            opt(row.resolved_period.and_then(|p| p.year)),
            d.target
                .value()
                .map(|v| v.to_string())
                .unwrap_or_else(|| UNDEFINED.to_string()),
            d.target.source().to_string(),
            d.outcome.code().to_string(),
            tier,
            opt(d.discount_pct()),
            opt_2dp(d.metric),
            opt_2dp(row.markdown_price),
            opt_2dp(row.margin_pct_after),
            opt_2dp(row.forecast_sales),
        ]
    }

    /// 写出批次，返回数据行数
    pub fn write<W: Write>(&self, batch: &AnalysisBatch, writer: W) -> ApiResult<usize> {
        let mut csv_writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer.write_record(EXPORT_HEADERS)?;
        for row in &batch.rows {
            csv_writer.write_record(self.row_fields(row))?;
        }
        csv_writer.flush()?;

        Ok(batch.rows.len())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, batch: &AnalysisBatch, path: P) -> ApiResult<usize> {
        let file = File::create(path.as_ref())?;
        let rows = self.write(batch, file)?;
        info!(path = %path.as_ref().display(), rows, batch_id = %batch.batch_id, "批次已导出");
        Ok(rows)
    }
}
