// ==========================================
// Merchify 动态降价引擎 - 引擎层
// ==========================================
// 职责: 周转计算、期间解析、目标查找、档位判定、批次编排
// 红线: 引擎纯计算，不读写文件；所有判定必须输出 reason
// ==========================================

pub mod coverage;
pub mod forecast;
pub mod markdown;
pub mod orchestrator;
pub mod period;
pub mod target;

// 重导出核心引擎
pub use coverage::CoverageCalculator;
pub use forecast::{
    attach_forecasts, observations_from_records, ForecastError, ForecastPredictor,
    SalesObservation, TrailingMeanForecaster,
};
pub use markdown::MarkdownTierEngine;
pub use orchestrator::{markdown_price, margin_pct, MarkdownOrchestrator, SalesIndex};
pub use period::PeriodResolver;
pub use target::TargetCoverageResolver;
