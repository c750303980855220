// ==========================================
// Merchify 动态降价引擎 - 期间解析器
// ==========================================
// 职责: 日历周/日期 → 月份或季节；滚动窗口跨年回溯
// 要点: 跨年回溯必须使用上一年真实的 ISO 周数 (52 或 53)
// ==========================================

use crate::config::season_table::SeasonBoundaries;
use crate::domain::article::ArticleRecord;
use crate::domain::decision::ResolvedPeriod;
use crate::domain::types::{Period, PeriodMode, WeekKey};
use chrono::{Datelike, NaiveDate, Weekday};

/// 无年份时按 52 周回绕
const YEARLESS_WEEKS: u32 = 52;

/// 无年份时推算月份用的非闰年参考年
const YEARLESS_REFERENCE_YEAR: i32 = 2023;

// ==========================================
// PeriodResolver - 期间解析器
// ==========================================
pub struct PeriodResolver<'a> {
    mode: PeriodMode,
    boundaries: &'a SeasonBoundaries,
}

impl<'a> PeriodResolver<'a> {
    pub fn new(mode: PeriodMode, boundaries: &'a SeasonBoundaries) -> Self {
        Self { mode, boundaries }
    }

    /// 解析行所属期间
    ///
    /// # 规则
    /// - 月份模式: 有日期取日期所在月；否则取 ISO 周周四所在月
    /// - 季节模式: 按季节周表查 KW
    ///
    /// 行既无 KW 也无日期时返回 None
    pub fn resolve(&self, record: &ArticleRecord, default_year: Option<i32>) -> Option<ResolvedPeriod> {
        match self.mode {
            PeriodMode::Month => {
                if let Some(date) = record.date {
                    return Some(ResolvedPeriod {
                        period: Period::Month(date.month()),
                        year: Some(date.year()),
                    });
                }
                let key = record.week_key(default_year)?;
                self.resolve_week(key)
            }
            PeriodMode::Season => {
                let key = record.week_key(default_year)?;
                self.resolve_week(key)
            }
        }
    }

    /// 按周键解析期间
    ///
    /// 季节模式下 KW 不在周表内（如 0 或 54）时返回 None
    pub fn resolve_week(&self, key: WeekKey) -> Option<ResolvedPeriod> {
        let period = match self.mode {
            PeriodMode::Month => Period::Month(Self::month_for_week(key)),
            PeriodMode::Season => Period::Season(self.boundaries.season_for_week(key.week)?),
        };
        Some(ResolvedPeriod {
            period,
            year: key.year,
        })
    }

    /// ISO 年的周数（52 或 53）
    ///
    /// 12 月 28 日总在该年最后一个 ISO 周内
    pub fn iso_weeks_in_year(year: i32) -> u32 {
        NaiveDate::from_ymd_opt(year, 12, 28)
            .map(|d| d.iso_week().week())
            .unwrap_or(YEARLESS_WEEKS)
    }

    /// 滚动窗口: 以 (year, week) 结尾的 k 个周键，按时间升序
    pub fn trailing_weeks(year: i32, week: u32, k: usize) -> Vec<WeekKey> {
        Self::trailing_window(WeekKey::new(year, week), k)
    }

    /// 滚动窗口（支持无年份周键）
    pub fn trailing_window(end: WeekKey, k: usize) -> Vec<WeekKey> {
        let mut keys = Vec::with_capacity(k);
        let mut current = end;

        for _ in 0..k {
            keys.push(current);
            current = Self::previous_week(current);
        }

        keys.reverse();
        keys
    }

    /// 上一周
    pub fn previous_week(key: WeekKey) -> WeekKey {
        if key.week > 1 {
            return WeekKey {
                year: key.year,
                week: key.week - 1,
            };
        }

        match key.year {
            Some(y) => WeekKey::new(y - 1, Self::iso_weeks_in_year(y - 1)),
            None => WeekKey::without_year(YEARLESS_WEEKS),
        }
    }

    /// ISO 周 → 月份（取该周周四）
    pub fn month_for_week(key: WeekKey) -> u32 {
        let exact = key
            .year
            .and_then(|y| NaiveDate::from_isoywd_opt(y, key.week, Weekday::Thu));

        match exact {
            Some(d) => d.month(),
            None => {
                let ordinal = ((key.week.clamp(1, 53) - 1) * 7 + 4).min(365);
                NaiveDate::from_yo_opt(YEARLESS_REFERENCE_YEAR, ordinal)
                    .map(|d| d.month())
                    .unwrap_or(12)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Season;

    #[test]
    fn test_iso_weeks_in_year() {
        assert_eq!(PeriodResolver::iso_weeks_in_year(2024), 52);
        assert_eq!(PeriodResolver::iso_weeks_in_year(2020), 53);
        assert_eq!(PeriodResolver::iso_weeks_in_year(2026), 53);
        assert_eq!(PeriodResolver::iso_weeks_in_year(2025), 52);
    }

    #[test]
    fn test_trailing_weeks_within_year() {
        let keys = PeriodResolver::trailing_weeks(2025, 10, 4);
        let weeks: Vec<u32> = keys.iter().map(|k| k.week).collect();
        assert_eq!(weeks, vec![7, 8, 9, 10]);
        assert!(keys.iter().all(|k| k.year == Some(2025)));
    }

    #[test]
    fn test_previous_week_crosses_year() {
        assert_eq!(
            PeriodResolver::previous_week(WeekKey::new(2021, 1)),
            WeekKey::new(2020, 53)
        );
        assert_eq!(
            PeriodResolver::previous_week(WeekKey::new(2025, 1)),
            WeekKey::new(2024, 52)
        );
        assert_eq!(
            PeriodResolver::previous_week(WeekKey::without_year(1)),
            WeekKey::without_year(52)
        );
    }

    #[test]
    fn test_month_for_week() {
        // 2025-W01 周四 = 2025-01-02
        assert_eq!(PeriodResolver::month_for_week(WeekKey::new(2025, 1)), 1);
        // 2020-W53 周四 = 2020-12-31
        assert_eq!(PeriodResolver::month_for_week(WeekKey::new(2020, 53)), 12);
        // 无年份近似
        assert_eq!(PeriodResolver::month_for_week(WeekKey::without_year(27)), 7);
    }

    #[test]
    fn test_resolve_week_season_mode() {
        let boundaries = SeasonBoundaries::default();
        let resolver = PeriodResolver::new(PeriodMode::Season, &boundaries);

        let p = resolver.resolve_week(WeekKey::new(2025, 2)).unwrap();
        assert_eq!(p.period, Period::Season(Season::Winter));
        assert_eq!(p.year, Some(2025));
        assert_eq!(p.key(), "WINTER");

        assert!(resolver.resolve_week(WeekKey::new(2025, 54)).is_none());
    }
}
