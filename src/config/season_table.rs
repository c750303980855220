// ==========================================
// Merchify 动态降价引擎 - 季节周表
// ==========================================
// 默认: 冬 KW49-53 + KW1-9 / 春 KW10-22 / 夏 KW23-35 / 秋 KW36-48
// 约束: 四个列表对 KW1..=53 构成完全且互斥的划分
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::Season;
use serde::{Deserialize, Serialize};

/// ISO 周最大编号
pub const MAX_ISO_WEEK: u32 = 53;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonBoundaries {
    pub winter: Vec<u32>,
    pub spring: Vec<u32>,
    pub summer: Vec<u32>,
    pub autumn: Vec<u32>,
}

impl Default for SeasonBoundaries {
    fn default() -> Self {
        Self {
            winter: (49..=53).chain(1..=9).collect(),
            spring: (10..=22).collect(),
            summer: (23..=35).collect(),
            autumn: (36..=48).collect(),
        }
    }
}

impl SeasonBoundaries {
    fn weeks_of(&self, season: Season) -> &[u32] {
        match season {
            Season::Winter => &self.winter,
            Season::Spring => &self.spring,
            Season::Summer => &self.summer,
            Season::Autumn => &self.autumn,
        }
    }

    /// 查找周所属季节
    ///
    /// 已校验的周表对 1..=53 总能返回 Some
    pub fn season_for_week(&self, week: u32) -> Option<Season> {
        Season::ALL
            .iter()
            .copied()
            .find(|s| self.weeks_of(*s).contains(&week))
    }

    /// 校验周表是否为 1..=53 的完全互斥划分
    pub fn validate(&self) -> ConfigResult<()> {
        let mut owner: [Option<Season>; (MAX_ISO_WEEK + 1) as usize] =
            [None; (MAX_ISO_WEEK + 1) as usize];

        for season in Season::ALL {
            for &week in self.weeks_of(season) {
                if week == 0 || week > MAX_ISO_WEEK {
                    return Err(ConfigError::InvalidSeasonBoundaries(format!(
                        "{} 包含非法周 {}",
                        season, week
                    )));
                }
                if let Some(existing) = owner[week as usize] {
                    return Err(ConfigError::InvalidSeasonBoundaries(format!(
                        "KW{} 同时属于 {} 和 {}",
                        week, existing, season
                    )));
                }
                owner[week as usize] = Some(season);
            }
        }

        let missing: Vec<String> = (1..=MAX_ISO_WEEK)
            .filter(|w| owner[*w as usize].is_none())
            .map(|w| w.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::InvalidSeasonBoundaries(format!(
                "以下周未归属任何季节: {}",
                missing.join(",")
            )));
        }

        Ok(())
    }
}
