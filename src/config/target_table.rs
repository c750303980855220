// ==========================================
// Merchify 动态降价引擎 - 目标周转表
// ==========================================
// 结构: 品类 → 期间键 → 目标周数
// 缺省: default_target（显式配置；未配置则结果为 Undefined，绝不隐式为 0）
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::decision::TargetCoverage;
use crate::domain::types::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetCoverageTable {
    /// 品类 → (期间键 → 目标周数)
    #[serde(default)]
    pub entries: BTreeMap<String, BTreeMap<String, f64>>,

    /// 未命中时的默认目标
    #[serde(default)]
    pub default_target: Option<f64>,
}

impl TargetCoverageTable {
    pub fn new(default_target: Option<f64>) -> Self {
        Self {
            entries: BTreeMap::new(),
            default_target,
        }
    }

    /// 精确查表 (品类, 期间)
    pub fn lookup(&self, category: &str, period: &Period) -> TargetCoverage {
        let hit = self
            .entries
            .get(category.trim())
            .and_then(|by_period| by_period.get(period.key()))
            .copied();

        match (hit, self.default_target) {
            (Some(v), _) => TargetCoverage::Configured(v),
            (None, Some(d)) => TargetCoverage::Default(d),
            (None, None) => TargetCoverage::Undefined,
        }
    }

    /// 写入单元格（期间键会被规范化，如 "Winter" → "WINTER"）
    pub fn set(&mut self, category: &str, period_key: &str, target: f64) -> ConfigResult<()> {
        let category = category.trim();
        let period = Self::parse_period(category, period_key)?;
        Self::check_value(category, period.key(), target)?;

        self.entries
            .entry(category.to_string())
            .or_default()
            .insert(period.key().to_string(), target);
        Ok(())
    }

    /// 删除单元格，返回旧值
    pub fn remove(&mut self, category: &str, period_key: &str) -> ConfigResult<Option<f64>> {
        let category = category.trim();
        let period = Self::parse_period(category, period_key)?;

        let removed = match self.entries.get_mut(category) {
            Some(by_period) => by_period.remove(period.key()),
            None => None,
        };
        if self.entries.get(category).map_or(false, |m| m.is_empty()) {
            self.entries.remove(category);
        }
        Ok(removed)
    }

    pub fn set_default(&mut self, default_target: Option<f64>) -> ConfigResult<()> {
        if let Some(d) = default_target {
            Self::check_value("*", "*", d)?;
        }
        self.default_target = default_target;
        Ok(())
    }

    /// 校验并规范化（用户编辑的配置文件可能混用大小写/德文键）
    pub fn normalized(&self) -> ConfigResult<Self> {
        let mut out = Self::new(None);
        out.set_default(self.default_target)?;

        for (category, by_period) in &self.entries {
            if category.trim().is_empty() {
                return Err(ConfigError::InvalidTarget {
                    category: category.clone(),
                    period: "*".to_string(),
                    message: "品类为空".to_string(),
                });
            }
            for (period_key, value) in by_period {
                let period = Self::parse_period(category, period_key)?;
                let normalized = out
                    .entries
                    .entry(category.trim().to_string())
                    .or_default();
                if normalized.contains_key(period.key()) {
                    return Err(ConfigError::InvalidTarget {
                        category: category.clone(),
                        period: period_key.clone(),
                        message: format!("与 {} 重复", period.key()),
                    });
                }
                Self::check_value(category, period_key, *value)?;
                normalized.insert(period.key().to_string(), *value);
            }
        }

        Ok(out)
    }

    /// 所有已配置的目标值（含默认值）
    pub fn all_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries
            .values()
            .flat_map(|m| m.values().copied())
            .chain(self.default_target)
    }

    fn parse_period(category: &str, period_key: &str) -> ConfigResult<Period> {
        Period::from_key(period_key).ok_or_else(|| ConfigError::InvalidTarget {
            category: category.to_string(),
            period: period_key.to_string(),
            message: "无法识别的期间键".to_string(),
        })
    }

    fn check_value(category: &str, period: &str, value: f64) -> ConfigResult<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidTarget {
                category: category.to_string(),
                period: period.to_string(),
                message: format!("目标周数必须为非负有限数: {}", value),
            });
        }
        Ok(())
    }
}
