// ==========================================
// Merchify 动态降价引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、结果对象
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod article;
pub mod decision;
pub mod types;

// 重导出核心类型
pub use article::{
    ArticleRecord, DqLevel, DqReport, DqSummary, DqViolation, ImportOutcome, RawArticleRecord,
};
pub use decision::{
    AnalysisBatch, AnnotatedArticle, BatchSummary, Coverage, DecisionOutcome, MarkdownDecision,
    MarkdownTier, ResolvedPeriod, TargetCoverage,
};
pub use types::{
    ComparisonPolicy, Period, PeriodMode, SalesRateMode, Season, WeekKey, ZeroSalesPolicy,
};
