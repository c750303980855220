// ==========================================
// Merchify 动态降价引擎 - 定价配置快照
// ==========================================
// 一次分析只读取一个不可变快照；修改只能通过 ConfigManager 的显式操作
// 文件格式: JSON
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::season_table::SeasonBoundaries;
use crate::config::target_table::TargetCoverageTable;
use crate::config::tier_rules::TierRuleSet;
use crate::domain::types::{ComparisonPolicy, PeriodMode, SalesRateMode, ZeroSalesPolicy};
use serde::{Deserialize, Serialize};

/// 默认滚动窗口（周）
pub const DEFAULT_TRAILING_WINDOW: usize = 4;

fn default_version() -> u64 {
    1
}

fn default_period_mode() -> PeriodMode {
    PeriodMode::Season
}

fn default_sales_rate_mode() -> SalesRateMode {
    SalesRateMode::TrailingMean
}

fn default_trailing_window() -> usize {
    DEFAULT_TRAILING_WINDOW
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// 配置版本号，每次显式修改 +1
    #[serde(default = "default_version")]
    pub version: u64,

    #[serde(default = "default_period_mode")]
    pub period_mode: PeriodMode,

    #[serde(default)]
    pub season_boundaries: SeasonBoundaries,

    #[serde(default = "default_sales_rate_mode")]
    pub sales_rate_mode: SalesRateMode,

    #[serde(default = "default_trailing_window")]
    pub trailing_window: usize,

    /// 源数据只有 KW 没有年份时使用
    #[serde(default)]
    pub default_year: Option<i32>,

    #[serde(default)]
    pub targets: TargetCoverageTable,

    #[serde(default)]
    pub tier_rules: TierRuleSet,

    /// 零销量处理策略，配置文件中必须显式给出
    pub zero_sales_policy: ZeroSalesPolicy,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            period_mode: default_period_mode(),
            season_boundaries: SeasonBoundaries::default(),
            sales_rate_mode: default_sales_rate_mode(),
            trailing_window: DEFAULT_TRAILING_WINDOW,
            default_year: None,
            targets: TargetCoverageTable::new(Some(4.0)),
            tier_rules: TierRuleSet::default(),
            zero_sales_policy: ZeroSalesPolicy::ReviewRequired,
        }
    }
}

impl PricingConfig {
    /// 从 JSON 解析并校验（目标表键会被规范化）
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let mut config: PricingConfig = serde_json::from_str(json)?;
        config.targets = config.targets.normalized()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 整体校验
    pub fn validate(&self) -> ConfigResult<()> {
        if self.trailing_window == 0 {
            return Err(ConfigError::InvalidTrailingWindow(self.trailing_window));
        }

        self.season_boundaries.validate()?;
        self.tier_rules.validate()?;
        self.targets.normalized()?;

        // 比率策略下目标为 0 无意义（coverage / 0）
        if self.tier_rules.policy == ComparisonPolicy::Ratio {
            if let Some(bad) = self.targets.all_values().find(|v| *v <= 0.0) {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "比率策略要求目标周数 > 0，发现 {}",
                    bad
                )));
            }
        }

        if let Some(year) = self.default_year {
            if !(1900..=9999).contains(&year) {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "default_year 超出范围: {}",
                    year
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PricingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_sales_policy_must_be_explicit() {
        let json = r#"{ "trailing_window": 4 }"#;
        let err = PricingConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().contains("zero_sales_policy"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let json = r#"{ "zero_sales_policy": "review_required" }"#;
        let config = PricingConfig::from_json_str(json).unwrap();
        assert_eq!(config.trailing_window, 4);
        assert_eq!(config.period_mode, PeriodMode::Season);
        assert_eq!(config.tier_rules.policy, ComparisonPolicy::AbsoluteGap);
        assert_eq!(config.targets.default_target, None);
    }

    #[test]
    fn test_full_config_parse() {
        let json = r#"{
            "version": 3,
            "period_mode": "month",
            "sales_rate_mode": "latest",
            "trailing_window": 6,
            "targets": {
                "entries": { "Jacken": { "Winter": 8, "januar": 6 } },
                "default_target": 4
            },
            "tier_rules": {
                "policy": "ratio",
                "rules": [
                    { "threshold": 1.5, "tier": { "label": "-30%", "discount_pct": 30 } },
                    { "threshold": 1.0, "tier": { "label": "-10%", "discount_pct": 10 } }
                ],
                "base_tier": { "label": "0%", "discount_pct": 0 }
            },
            "zero_sales_policy": "treat_as_overstock"
        }"#;

        let config = PricingConfig::from_json_str(json).unwrap();
        assert_eq!(config.version, 3);
        assert_eq!(config.sales_rate_mode, SalesRateMode::Latest);
        let jacken = config.targets.entries.get("Jacken").unwrap();
        assert_eq!(jacken.get("WINTER"), Some(&8.0));
        assert_eq!(jacken.get("JANUARY"), Some(&6.0));
        assert_eq!(config.zero_sales_policy, ZeroSalesPolicy::TreatAsOverstock);
    }

    #[test]
    fn test_ratio_policy_rejects_zero_target() {
        let mut config = PricingConfig::default();
        config.tier_rules = TierRuleSet::ratio_default();
        config.targets.set("Hosen", "SUMMER", 0.0).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_trailing_window_rejected() {
        let mut config = PricingConfig::default();
        config.trailing_window = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTrailingWindow(0))
        ));
    }

    #[test]
    fn test_non_monotonic_json_rejected_at_load() {
        let json = r#"{
            "tier_rules": {
                "policy": "absolute_gap",
                "rules": [
                    { "threshold": 4, "tier": { "label": "-20%", "discount_pct": 20 } },
                    { "threshold": 10, "tier": { "label": "-30%", "discount_pct": 30 } }
                ],
                "base_tier": { "label": "0%", "discount_pct": 0 }
            },
            "zero_sales_policy": "review_required"
        }"#;
        let err = PricingConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::NonMonotonicThresholds { .. }));
    }
}
