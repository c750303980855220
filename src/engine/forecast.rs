// ==========================================
// Merchify 动态降价引擎 - 销量预测接口
// ==========================================
// 职责: 外部预测模型的 train/predict 接缝
// 内置: TrailingMeanForecaster（滚动均值基线）
// ==========================================

use crate::domain::article::ArticleRecord;
use crate::domain::decision::AnalysisBatch;
use crate::domain::types::WeekKey;
use crate::engine::coverage::CoverageCalculator;
use crate::engine::period::PeriodResolver;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug, PartialEq)]
pub enum ForecastError {
    #[error("训练数据为空")]
    EmptyHistory,

    #[error("窗口长度无效: {0}")]
    InvalidWindow(usize),

    #[error("模型训练失败: {0}")]
    TrainingFailed(String),
}

/// 一条历史销量观测（同一商品同一周已累加）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesObservation {
    pub article_id: String,
    pub week_key: WeekKey,
    pub sales_qty: f64,
}

/// 记录 → 观测序列，按 (商品, 周) 升序
pub fn observations_from_records(
    records: &[ArticleRecord],
    default_year: Option<i32>,
) -> Vec<SalesObservation> {
    let mut grouped: BTreeMap<(String, WeekKey), f64> = BTreeMap::new();
    for record in records {
        if let Some(key) = record.week_key(default_year) {
            *grouped.entry((record.article_id.clone(), key)).or_insert(0.0) += record.sales_qty;
        }
    }

    grouped
        .into_iter()
        .map(|((article_id, week_key), sales_qty)| SalesObservation {
            article_id,
            week_key,
            sales_qty,
        })
        .collect()
}

// ==========================================
// ForecastPredictor Trait
// ==========================================
pub trait ForecastPredictor {
    fn name(&self) -> &str;

    fn train(&mut self, history: &[SalesObservation]) -> Result<(), ForecastError>;

    /// 未来 horizon_weeks 周的累计销量预测；未知商品返回 None
    fn predict(&self, article_id: &str, horizon_weeks: u32) -> Option<f64>;
}

// ==========================================
// TrailingMeanForecaster - 滚动均值基线
// ==========================================
// 每个商品取最近一周往前 window 周的均值（缺失周记 0）
pub struct TrailingMeanForecaster {
    window: usize,
    weekly_rate: HashMap<String, f64>,
}

impl TrailingMeanForecaster {
    pub fn new(window: usize) -> Result<Self, ForecastError> {
        if window == 0 {
            return Err(ForecastError::InvalidWindow(window));
        }
        Ok(Self {
            window,
            weekly_rate: HashMap::new(),
        })
    }

    pub fn weekly_rate(&self, article_id: &str) -> Option<f64> {
        self.weekly_rate.get(article_id).copied()
    }
}

impl ForecastPredictor for TrailingMeanForecaster {
    fn name(&self) -> &str {
        "trailing_mean"
    }

    fn train(&mut self, history: &[SalesObservation]) -> Result<(), ForecastError> {
        if history.is_empty() {
            return Err(ForecastError::EmptyHistory);
        }

        let mut per_article: HashMap<&str, BTreeMap<WeekKey, f64>> = HashMap::new();
        for obs in history {
            *per_article
                .entry(obs.article_id.as_str())
                .or_default()
                .entry(obs.week_key)
                .or_insert(0.0) += obs.sales_qty;
        }

        self.weekly_rate.clear();
        for (article_id, weeks) in per_article {
            let Some((&latest, _)) = weeks.iter().next_back() else {
                continue;
            };
            let window: Vec<f64> = PeriodResolver::trailing_window(latest, self.window)
                .into_iter()
                .map(|k| weeks.get(&k).copied().unwrap_or(0.0))
                .collect();
            self.weekly_rate.insert(
                article_id.to_string(),
                CoverageCalculator::trailing_mean_rate(&window),
            );
        }

        Ok(())
    }

    fn predict(&self, article_id: &str, horizon_weeks: u32) -> Option<f64> {
        self.weekly_rate
            .get(article_id)
            .map(|rate| rate * f64::from(horizon_weeks))
    }
}

/// 把预测结果写入批次
///
/// 返回得到预测值的行数
#[instrument(skip(batch, predictor), fields(predictor = predictor.name()))]
pub fn attach_forecasts(
    batch: &mut AnalysisBatch,
    predictor: &dyn ForecastPredictor,
    horizon_weeks: u32,
) -> usize {
    let mut attached = 0;
    for row in &mut batch.rows {
        row.forecast_sales = predictor.predict(&row.record.article_id, horizon_weeks);
        if row.forecast_sales.is_some() {
            attached += 1;
        }
    }
    info!(attached, total = batch.rows.len(), "预测已写入批次");
    attached
}
