// ==========================================
// Merchify 动态降价引擎 - 核心库
// ==========================================
// 系统定位: 降价决策支持 (人工最终确认价格)
// 主线: POS 周数据 → 周转周数 → 目标对比 → 降价档位
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 目标表 / 档位规则 / 季节周表
pub mod config;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// API 层 - 业务接口
pub mod api;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ComparisonPolicy, Period, PeriodMode, SalesRateMode, Season, WeekKey, ZeroSalesPolicy,
};

// 领域实体与结果
pub use domain::{
    AnalysisBatch, AnnotatedArticle, ArticleRecord, BatchSummary, Coverage, DecisionOutcome,
    DqReport, MarkdownDecision, MarkdownTier, TargetCoverage,
};

// 配置
pub use config::{ConfigManager, PricingConfig, SeasonBoundaries, TargetCoverageTable, TierRuleSet};

// 引擎
pub use engine::{
    CoverageCalculator, ForecastPredictor, MarkdownOrchestrator, MarkdownTierEngine,
    PeriodResolver, TargetCoverageResolver, TrailingMeanForecaster,
};

// API
pub use api::{ApiError, PricingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Merchify Dynamic Pricing";
