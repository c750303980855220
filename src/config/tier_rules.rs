// ==========================================
// Merchify 动态降价引擎 - 降价档位规则
// ==========================================
// 规则顺序: 最激进档在前，阈值严格递减
// 判定: 从前往后，第一个 metric > threshold 的规则命中；全部未命中取 base_tier
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::decision::MarkdownTier;
use crate::domain::types::ComparisonPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub threshold: f64,
    pub tier: MarkdownTier,
}

impl TierRule {
    pub fn new(threshold: f64, label: &str, discount_pct: f64) -> Self {
        Self {
            threshold,
            tier: MarkdownTier::new(label, discount_pct),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRuleSet {
    pub policy: ComparisonPolicy,
    pub rules: Vec<TierRule>,
    pub base_tier: MarkdownTier,
}

impl Default for TierRuleSet {
    fn default() -> Self {
        Self::absolute_gap_default()
    }
}

impl TierRuleSet {
    /// 绝对差策略: gap > 10 → -30%, gap > 4 → -20%, gap > 0 → -10%
    pub fn absolute_gap_default() -> Self {
        Self {
            policy: ComparisonPolicy::AbsoluteGap,
            rules: vec![
                TierRule::new(10.0, "-30%", 30.0),
                TierRule::new(4.0, "-20%", 20.0),
                TierRule::new(0.0, "-10%", 10.0),
            ],
            base_tier: MarkdownTier::new("0%", 0.0),
        }
    }

    /// 比率策略: ratio > 1.5 → -30%, ratio > 1.2 → -20%, ratio > 1.0 → -10%
    pub fn ratio_default() -> Self {
        Self {
            policy: ComparisonPolicy::Ratio,
            rules: vec![
                TierRule::new(1.5, "-30%", 30.0),
                TierRule::new(1.2, "-20%", 20.0),
                TierRule::new(1.0, "-10%", 10.0),
            ],
            base_tier: MarkdownTier::new("0%", 0.0),
        }
    }

    /// 仅按周转周数: > 12 → -50%, > 8 → -30%, > 4 → -20%, 否则不降价
    pub fn coverage_only_default() -> Self {
        Self {
            policy: ComparisonPolicy::CoverageOnly,
            rules: vec![
                TierRule::new(12.0, "-50%", 50.0),
                TierRule::new(8.0, "-30%", 30.0),
                TierRule::new(4.0, "-20%", 20.0),
            ],
            base_tier: MarkdownTier::new("0%", 0.0),
        }
    }

    /// 规则下标 → 档位等级（基础档为 0，第一条规则最高）
    pub fn level_of(&self, rule_index: usize) -> usize {
        self.rules.len() - rule_index
    }

    /// 最激进档位
    pub fn most_aggressive(&self) -> (&MarkdownTier, usize) {
        match self.rules.first() {
            Some(rule) => (&rule.tier, self.rules.len()),
            None => (&self.base_tier, 0),
        }
    }

    /// 校验规则表
    ///
    /// - 至少一条规则
    /// - 阈值有限且严格递减
    /// - 比率策略阈值 >= 0，仅周转策略阈值 >= 0
    /// - 折扣 0..=100 且随等级不减
    /// - 标签非空且唯一
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rules.is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "降价规则表为空".to_string(),
            ));
        }

        for (idx, rule) in self.rules.iter().enumerate() {
            if !rule.threshold.is_finite() {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "规则 {} 阈值非有限数",
                    idx
                )));
            }
            if self.policy != ComparisonPolicy::AbsoluteGap && rule.threshold < 0.0 {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "{} 策略下阈值不得为负 (规则 {}: {})",
                    self.policy, idx, rule.threshold
                )));
            }
            if idx > 0 {
                let previous = self.rules[idx - 1].threshold;
                if rule.threshold >= previous {
                    return Err(ConfigError::NonMonotonicThresholds {
                        index: idx,
                        previous,
                        current: rule.threshold,
                    });
                }
            }
        }

        let mut labels = HashSet::new();
        let mut previous_discount = f64::INFINITY;
        for tier in self.rules.iter().map(|r| &r.tier).chain(std::iter::once(&self.base_tier)) {
            if tier.label.trim().is_empty() {
                return Err(ConfigError::InvalidConfiguration(
                    "档位标签不能为空".to_string(),
                ));
            }
            if !labels.insert(tier.label.trim().to_string()) {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "档位标签重复: {}",
                    tier.label
                )));
            }
            if !(0.0..=100.0).contains(&tier.discount_pct) {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "档位 {} 折扣超出范围 [0, 100]: {}",
                    tier.label, tier.discount_pct
                )));
            }
            if tier.discount_pct > previous_discount {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "档位 {} 折扣高于更激进的档位",
                    tier.label
                )));
            }
            previous_discount = tier.discount_pct;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(TierRuleSet::absolute_gap_default().validate().is_ok());
        assert!(TierRuleSet::ratio_default().validate().is_ok());
        assert!(TierRuleSet::coverage_only_default().validate().is_ok());
    }

    #[test]
    fn test_non_monotonic_thresholds_rejected() {
        let mut rules = TierRuleSet::absolute_gap_default();
        rules.rules[1].threshold = 12.0;
        let err = rules.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonMonotonicThresholds { index: 1, .. }
        ));
    }

    #[test]
    fn test_equal_thresholds_rejected() {
        let mut rules = TierRuleSet::ratio_default();
        rules.rules[2].threshold = 1.2;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_discount_must_not_increase_downwards() {
        let mut rules = TierRuleSet::absolute_gap_default();
        rules.rules[2].tier.discount_pct = 25.0;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_keep_watch_reduce_labels_allowed() {
        let rules = TierRuleSet {
            policy: ComparisonPolicy::Ratio,
            rules: vec![
                TierRule::new(1.3, "Reduce", 20.0),
                TierRule::new(1.0, "Watch", 0.0),
            ],
            base_tier: MarkdownTier::new("Keep", 0.0),
        };
        assert!(rules.validate().is_ok());
        assert_eq!(rules.level_of(0), 2);
        assert_eq!(rules.level_of(1), 1);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let mut rules = TierRuleSet::absolute_gap_default();
        rules.base_tier.label = "-10%".to_string();
        assert!(rules.validate().is_err());
    }
}
