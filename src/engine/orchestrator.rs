// ==========================================
// Merchify 动态降价引擎 - 引擎编排器
// ==========================================
// 用途: 按顺序串联 周转 → 期间 → 目标 → 档位
// 红线: 一次运行只持有一个不可变配置快照；行与行互不影响
// ==========================================

use crate::config::pricing_config::PricingConfig;
use crate::domain::article::ArticleRecord;
use crate::domain::decision::{AnalysisBatch, AnnotatedArticle, BatchSummary, DecisionOutcome};
use crate::domain::types::{SalesRateMode, WeekKey};
use crate::engine::coverage::CoverageCalculator;
use crate::engine::markdown::MarkdownTierEngine;
use crate::engine::period::PeriodResolver;
use crate::engine::target::TargetCoverageResolver;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// (商品号, 周键) → 当周销量（重复行已累加）
pub type SalesIndex = HashMap<(String, WeekKey), f64>;

// ==========================================
// MarkdownOrchestrator - 引擎编排器
// ==========================================
pub struct MarkdownOrchestrator {
    config: Arc<PricingConfig>,
}

impl MarkdownOrchestrator {
    pub fn new(config: Arc<PricingConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// 执行一次批次分析
    ///
    /// # 返回
    /// 标注后的批次，行顺序与输入一致
    #[instrument(skip_all, fields(rows = records.len(), config_version = self.config.version))]
    pub fn run(&self, records: &[ArticleRecord]) -> AnalysisBatch {
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, "开始降价分析");

        let config = self.config.as_ref();
        let index = Self::build_sales_index(records, config.default_year);

        if config.sales_rate_mode == SalesRateMode::TrailingMean {
            let yearless = records
                .iter()
                .filter(|r| matches!(r.week_key(config.default_year), Some(k) if k.year.is_none()))
                .count();
            if yearless > 0 {
                warn!(
                    yearless_rows = yearless,
                    "部分行只有 KW 没有年份，滚动窗口按 52 周回绕"
                );
            }
        }

        let rows: Vec<AnnotatedArticle> = records
            .iter()
            .map(|record| self.annotate(record, &index))
            .collect();

        let summary = Self::summarize(&rows);

        info!(
            batch_id = %batch_id,
            tier_assigned = summary.tier_assigned,
            insufficient_sales_data = summary.insufficient_sales_data,
            no_target_defined = summary.no_target_defined,
            "降价分析完成"
        );

        AnalysisBatch {
            batch_id,
            config_version: config.version,
            generated_at: Utc::now(),
            rows,
            summary,
        }
    }

    /// 构建销量索引
    pub fn build_sales_index(records: &[ArticleRecord], default_year: Option<i32>) -> SalesIndex {
        let mut index = SalesIndex::new();
        for record in records {
            if let Some(key) = record.week_key(default_year) {
                *index.entry((record.article_id.clone(), key)).or_insert(0.0) += record.sales_qty;
            }
        }
        index
    }

    /// 单行销售速率
    ///
    /// 行无周键时只能使用该行自身销量
    pub fn sales_rate(&self, record: &ArticleRecord, key: Option<WeekKey>, index: &SalesIndex) -> f64 {
        let Some(key) = key else {
            return record.sales_qty;
        };

        let lookup = |k: WeekKey| {
            index
                .get(&(record.article_id.clone(), k))
                .copied()
                .unwrap_or(0.0)
        };

        match self.config.sales_rate_mode {
            SalesRateMode::Latest => lookup(key),
            SalesRateMode::TrailingMean => {
                let window: Vec<f64> = PeriodResolver::trailing_window(key, self.config.trailing_window)
                    .into_iter()
                    .map(lookup)
                    .collect();
                CoverageCalculator::trailing_mean_rate(&window)
            }
        }
    }

    fn annotate(&self, record: &ArticleRecord, index: &SalesIndex) -> AnnotatedArticle {
        let config = self.config.as_ref();

        let week_key = record.week_key(config.default_year);
        let sales_rate = self.sales_rate(record, week_key, index);
        let coverage = CoverageCalculator::weeks_of_coverage(record.stock_on_hand, sales_rate);

        let resolved_period = PeriodResolver::new(config.period_mode, &config.season_boundaries)
            .resolve(record, config.default_year);
        let target = TargetCoverageResolver::new(&config.targets)
            .resolve(&record.category, resolved_period.as_ref());

        let decision = MarkdownTierEngine::new(&config.tier_rules, config.zero_sales_policy)
            .evaluate(coverage, target);

        let markdown_price = match (record.unit_price, decision.discount_pct()) {
            (Some(price), Some(discount)) => Some(markdown_price(price, discount)),
            _ => None,
        };
        let margin_pct_after = match (markdown_price, record.unit_cost) {
            (Some(price), Some(cost)) => margin_pct(price, cost),
            _ => None,
        };

        debug!(
            article_id = %record.article_id,
            row = record.row_number,
            sales_rate,
            coverage = %coverage,
            decision = decision.label(),
            "行判定完成"
        );

        AnnotatedArticle {
            record: record.clone(),
            week_key,
            sales_rate,
            coverage,
            resolved_period,
            decision,
            markdown_price,
            margin_pct_after,
            forecast_sales: None,
        }
    }

    /// 批次汇总
    pub fn summarize(rows: &[AnnotatedArticle]) -> BatchSummary {
        let mut summary = BatchSummary {
            total_rows: rows.len(),
            ..BatchSummary::default()
        };

        for row in rows {
            match &row.decision.outcome {
                DecisionOutcome::TierAssigned { tier, .. } => {
                    summary.tier_assigned += 1;
                    *summary.by_tier.entry(tier.label.clone()).or_insert(0) += 1;
                    if tier.discount_pct > 0.0 {
                        summary.stock_under_markdown += row.record.stock_on_hand;
                        if let Some(price) = row.record.unit_price {
                            summary.stock_value_under_markdown += row.record.stock_on_hand * price;
                        }
                    }
                }
                DecisionOutcome::InsufficientSalesData => summary.insufficient_sales_data += 1,
                DecisionOutcome::NoTargetDefined => summary.no_target_defined += 1,
            }
        }

        summary
    }
}

/// 降价后价格
pub fn markdown_price(unit_price: f64, discount_pct: f64) -> f64 {
    unit_price * (1.0 - discount_pct / 100.0)
}

/// 降价后毛利率（%）；价格为 0 时无意义
pub fn margin_pct(price: f64, cost: f64) -> Option<f64> {
    if price <= 0.0 {
        return None;
    }
    Some((price - cost) / price * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::Coverage;
    use crate::domain::types::ZeroSalesPolicy;

    fn row(article_id: &str, year: i32, week: u32, stock: f64, sales: f64) -> ArticleRecord {
        ArticleRecord {
            article_id: article_id.to_string(),
            category: "Jacken".to_string(),
            year: Some(year),
            week: Some(week),
            date: None,
            stock_on_hand: stock,
            sales_qty: sales,
            unit_price: None,
            unit_cost: None,
            row_number: week as usize,
        }
    }

    fn config_with_target(target: f64) -> PricingConfig {
        let mut config = PricingConfig::default();
        config.targets.set("Jacken", "WINTER", target).unwrap();
        config
    }

    #[test]
    fn test_trailing_window_scenario() {
        let records: Vec<ArticleRecord> = (1..=4)
            .map(|w| row("A-1", 2025, w, 100.0, 10.0))
            .collect();
        let batch = MarkdownOrchestrator::new(Arc::new(config_with_target(8.0))).run(&records);

        let last = &batch.rows[3];
        assert_eq!(last.sales_rate, 10.0);
        assert_eq!(last.coverage, Coverage::Finite(10.0));
        assert_eq!(last.decision.metric, Some(2.0));
        assert_eq!(last.decision.label(), "-10%");
    }

    #[test]
    fn test_missing_weeks_count_as_zero() {
        // 窗口 W7..W10，只有 W10 有销量
        let records = vec![row("A-1", 2025, 10, 60.0, 12.0)];
        let batch = MarkdownOrchestrator::new(Arc::new(config_with_target(8.0))).run(&records);
        assert_eq!(batch.rows[0].sales_rate, 3.0);
        assert_eq!(batch.rows[0].coverage, Coverage::Finite(20.0));
    }

    #[test]
    fn test_duplicate_week_rows_are_summed() {
        let records = vec![row("A-1", 2025, 3, 40.0, 4.0), row("A-1", 2025, 3, 40.0, 6.0)];
        let mut config = config_with_target(2.0);
        config.sales_rate_mode = SalesRateMode::Latest;
        let batch = MarkdownOrchestrator::new(Arc::new(config)).run(&records);
        assert_eq!(batch.rows[0].sales_rate, 10.0);
        assert_eq!(batch.rows[1].sales_rate, 10.0);
    }

    #[test]
    fn test_zero_sales_row_summary() {
        let records = vec![row("A-1", 2025, 4, 50.0, 0.0)];
        let batch = MarkdownOrchestrator::new(Arc::new(config_with_target(8.0))).run(&records);
        assert_eq!(batch.rows[0].decision.outcome, DecisionOutcome::InsufficientSalesData);
        assert_eq!(batch.summary.insufficient_sales_data, 1);
        assert_eq!(batch.summary.tier_assigned, 0);
    }

    #[test]
    fn test_zero_sales_as_overstock_counts_stock_under_markdown() {
        let mut config = config_with_target(8.0);
        config.zero_sales_policy = ZeroSalesPolicy::TreatAsOverstock;
        let mut record = row("A-1", 2025, 4, 50.0, 0.0);
        record.unit_price = Some(20.0);
        let batch = MarkdownOrchestrator::new(Arc::new(config)).run(&[record]);

        assert_eq!(batch.rows[0].decision.label(), "-30%");
        assert_eq!(batch.rows[0].markdown_price, Some(14.0));
        assert_eq!(batch.summary.stock_under_markdown, 50.0);
        assert_eq!(batch.summary.stock_value_under_markdown, 1000.0);
    }

    #[test]
    fn test_no_target_without_default() {
        let mut config = PricingConfig::default();
        config.targets.default_target = None;
        let records = vec![row("A-1", 2025, 4, 50.0, 5.0)];
        let batch = MarkdownOrchestrator::new(Arc::new(config)).run(&records);
        assert_eq!(batch.rows[0].decision.outcome, DecisionOutcome::NoTargetDefined);
        assert_eq!(batch.summary.no_target_defined, 1);
    }

    #[test]
    fn test_margin_figures() {
        let mut record = row("A-1", 2025, 4, 100.0, 10.0);
        record.unit_price = Some(50.0);
        record.unit_cost = Some(30.0);
        let mut config = config_with_target(8.0);
        config.sales_rate_mode = SalesRateMode::Latest;
        let batch = MarkdownOrchestrator::new(Arc::new(config)).run(&[record]);

        // coverage 10, gap 2 → -10%
        assert_eq!(batch.rows[0].markdown_price, Some(45.0));
        let margin = batch.rows[0].margin_pct_after.unwrap();
        assert!((margin - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_follows_outcome_not_coverage() {
        let batch = MarkdownOrchestrator::new(Arc::new(config_with_target(8.0)))
            .run(&[row("A-1", 2025, 4, 50.0, 5.0)]);

        // 有限周转但结论为销量不足
        let mut insufficient = batch.rows[0].clone();
        assert!(matches!(insufficient.coverage, Coverage::Finite(_)));
        insufficient.decision.outcome = DecisionOutcome::InsufficientSalesData;

        // 周转无定义但结论为无目标
        let mut no_target = batch.rows[0].clone();
        no_target.coverage = Coverage::Undefined;
        no_target.decision.outcome = DecisionOutcome::NoTargetDefined;

        let summary = MarkdownOrchestrator::summarize(&[insufficient, no_target]);
        assert_eq!(summary.insufficient_sales_data, 1);
        assert_eq!(summary.no_target_defined, 1);
        assert_eq!(summary.tier_assigned, 0);
        assert!(summary.by_tier.is_empty());
    }

    #[test]
    fn test_margin_pct_zero_price() {
        assert_eq!(margin_pct(0.0, 5.0), None);
    }
}
