// ==========================================
// Merchify 动态降价引擎 - 决策结果对象
// ==========================================
// 职责: 周转结果 / 目标周转 / 降价决策 / 批次输出
// 红线: 零销量与缺失目标是"数据"，不是错误；不得以大数或 0 代替
// ==========================================

use crate::domain::article::ArticleRecord;
use crate::domain::types::{ComparisonPolicy, Period, WeekKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// Coverage - 周转周数 (Reichweite)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Coverage {
    Finite(f64), // stock / rate，未取整
    Undefined,   // 销售速率为 0（无近期销售）
}

impl Coverage {
    pub fn value(&self) -> Option<f64> {
        match self {
            Coverage::Finite(v) => Some(*v),
            Coverage::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Coverage::Undefined)
    }

    /// 展示用取整（一位小数），内部比较不使用
    pub fn display_rounded(&self) -> Option<f64> {
        self.value().map(round_one_decimal)
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coverage::Finite(v) => write!(f, "{:.1}", v),
            Coverage::Undefined => write!(f, "undefined"),
        }
    }
}

/// 一位小数取整
pub fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ==========================================
// ResolvedPeriod - 解析后的期间
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPeriod {
    pub period: Period,
    pub year: Option<i32>,
}

impl ResolvedPeriod {
    pub fn key(&self) -> &'static str {
        self.period.key()
    }
}

// ==========================================
// TargetCoverage - 目标周转
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetCoverage {
    Configured(f64), // (品类, 期间) 精确命中
    Default(f64),    // 未命中，使用显式默认值
    Undefined,       // 未命中且无默认值
}

impl TargetCoverage {
    pub fn value(&self) -> Option<f64> {
        match self {
            TargetCoverage::Configured(v) | TargetCoverage::Default(v) => Some(*v),
            TargetCoverage::Undefined => None,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            TargetCoverage::Configured(_) => "configured",
            TargetCoverage::Default(_) => "default",
            TargetCoverage::Undefined => "undefined",
        }
    }
}

// ==========================================
// MarkdownTier - 降价档位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownTier {
    pub label: String,     // 展示标签，如 "-20%" / "Reduce"
    pub discount_pct: f64, // 折扣百分比，0..=100
}

impl MarkdownTier {
    pub fn new(label: &str, discount_pct: f64) -> Self {
        Self {
            label: label.to_string(),
            discount_pct,
        }
    }
}

// ==========================================
// DecisionOutcome - 决策结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionOutcome {
    /// 命中档位; level=0 为基础档（不降价），数值越大越激进
    TierAssigned { tier: MarkdownTier, level: usize },
    InsufficientSalesData,
    NoTargetDefined,
}

impl DecisionOutcome {
    pub fn code(&self) -> &'static str {
        match self {
            DecisionOutcome::TierAssigned { .. } => "TIER_ASSIGNED",
            DecisionOutcome::InsufficientSalesData => "INSUFFICIENT_SALES_DATA",
            DecisionOutcome::NoTargetDefined => "NO_TARGET_DEFINED",
        }
    }
}

// ==========================================
// MarkdownDecision - 降价决策（附审计输入）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownDecision {
    pub outcome: DecisionOutcome,
    pub coverage: Coverage,
    pub target: TargetCoverage,
    pub policy: ComparisonPolicy,
    pub metric: Option<f64>, // gap / ratio / coverage，视策略而定
    pub reason: String,      // JSON 决策原因
}

impl MarkdownDecision {
    /// 机器可读标签
    ///
    /// 命中档位时为档位标签，否则为固定英文短语
    pub fn label(&self) -> &str {
        match &self.outcome {
            DecisionOutcome::TierAssigned { tier, .. } => &tier.label,
            DecisionOutcome::InsufficientSalesData => "insufficient sales data",
            DecisionOutcome::NoTargetDefined => "no target defined",
        }
    }

    /// 本地化展示标签
    pub fn display_label(&self) -> String {
        match &self.outcome {
            DecisionOutcome::TierAssigned { tier, .. } => tier.label.clone(),
            DecisionOutcome::InsufficientSalesData => {
                crate::i18n::t("decision.insufficient_sales_data")
            }
            DecisionOutcome::NoTargetDefined => crate::i18n::t("decision.no_target_defined"),
        }
    }

    pub fn tier(&self) -> Option<&MarkdownTier> {
        match &self.outcome {
            DecisionOutcome::TierAssigned { tier, .. } => Some(tier),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<usize> {
        match &self.outcome {
            DecisionOutcome::TierAssigned { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub fn discount_pct(&self) -> Option<f64> {
        self.tier().map(|t| t.discount_pct)
    }
}

// ==========================================
// AnnotatedArticle - 标注后的行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedArticle {
    pub record: ArticleRecord,
    pub week_key: Option<WeekKey>,
    pub sales_rate: f64,
    pub coverage: Coverage,
    pub resolved_period: Option<ResolvedPeriod>,
    pub decision: MarkdownDecision,
    pub markdown_price: Option<f64>,
    pub margin_pct_after: Option<f64>,
    pub forecast_sales: Option<f64>,
}

// ==========================================
// BatchSummary - 批次汇总
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub tier_assigned: usize,
    pub insufficient_sales_data: usize,
    pub no_target_defined: usize,
    pub by_tier: BTreeMap<String, usize>,
    pub stock_under_markdown: f64,       // 折扣 > 0 的库存件数
    pub stock_value_under_markdown: f64, // 折扣 > 0 的库存原价金额（有单价时）
}

// ==========================================
// AnalysisBatch - 一次分析的完整输出
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisBatch {
    pub batch_id: String,
    pub config_version: u64,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<AnnotatedArticle>,
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_display_rounding_only_for_display() {
        let c = Coverage::Finite(10.0 / 3.0);
        assert_eq!(c.display_rounded(), Some(3.3));
        assert_eq!(c.value(), Some(10.0 / 3.0));
        assert_eq!(c.to_string(), "3.3");
        assert_eq!(Coverage::Undefined.to_string(), "undefined");
    }

    #[test]
    fn test_target_source() {
        assert_eq!(TargetCoverage::Configured(8.0).source(), "configured");
        assert_eq!(TargetCoverage::Default(4.0).value(), Some(4.0));
        assert_eq!(TargetCoverage::Undefined.value(), None);
    }

    #[test]
    fn test_decision_labels() {
        let decision = MarkdownDecision {
            outcome: DecisionOutcome::InsufficientSalesData,
            coverage: Coverage::Undefined,
            target: TargetCoverage::Default(4.0),
            policy: ComparisonPolicy::AbsoluteGap,
            metric: None,
            reason: "{}".to_string(),
        };
        assert_eq!(decision.label(), "insufficient sales data");
        assert_eq!(decision.outcome.code(), "INSUFFICIENT_SALES_DATA");
        assert_eq!(decision.level(), None);
    }
}
