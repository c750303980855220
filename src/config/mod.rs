// ==========================================
// Merchify 动态降价引擎 - 配置层
// ==========================================
// 职责: 目标周转表、降价档位规则、季节周表、配置管理
// 存储: JSON 文件（无数据库）
// ==========================================

pub mod config_manager;
pub mod error;
pub mod pricing_config;
pub mod season_table;
pub mod target_table;
pub mod tier_rules;

// 重导出核心配置类型
pub use config_manager::{get_default_config_path, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use pricing_config::{PricingConfig, DEFAULT_TRAILING_WINDOW};
pub use season_table::SeasonBoundaries;
pub use target_table::TargetCoverageTable;
pub use tier_rules::{TierRule, TierRuleSet};
