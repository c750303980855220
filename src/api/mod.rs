// ==========================================
// Merchify 动态降价引擎 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供 CLI 及上层展示层调用
// ==========================================

pub mod error;
pub mod export;
pub mod pricing_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use export::{CsvExporter, EXPORT_HEADERS};
pub use pricing_api::{AnalysisReport, MultiFileReport, PricingApi};
