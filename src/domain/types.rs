// ==========================================
// Merchify 动态降价引擎 - 领域类型定义
// ==========================================
// 季节/月份/策略枚举
// 序列化格式: 季节与月份用 SCREAMING_SNAKE_CASE，策略用 snake_case (与配置文件一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 季节类型 (Season)
// ==========================================
// 冬季跨年: 默认 KW49-53 + KW1-9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    Winter, // 冬 (Winter)
    Spring, // 春 (Frühling)
    Summer, // 夏 (Sommer)
    Autumn, // 秋 (Herbst)
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    /// 转换为查表键
    pub fn as_key(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Autumn => "AUTUMN",
        }
    }

    /// 从字符串解析季节（兼容英文/德文名称，大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Some(Season::Winter),
            "spring" | "frühling" | "fruehling" => Some(Season::Spring),
            "summer" | "sommer" => Some(Season::Summer),
            "autumn" | "fall" | "herbst" => Some(Season::Autumn),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

// ==========================================
// 月份键 (Month)
// ==========================================
const MONTH_KEYS: [&str; 12] = [
    "JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE", "JULY", "AUGUST", "SEPTEMBER",
    "OCTOBER", "NOVEMBER", "DECEMBER",
];

const MONTH_NAMES_DE: [&str; 12] = [
    "januar", "februar", "märz", "april", "mai", "juni", "juli", "august", "september",
    "oktober", "november", "dezember",
];

// ==========================================
// 期间 (Period)
// ==========================================
// 目标周转查表的时间维度: 月份或季节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    Month(u32), // 1..=12
    Season(Season),
}

impl Period {
    /// 查表键（月份: JANUARY..DECEMBER，季节: WINTER..AUTUMN）
    pub fn key(&self) -> &'static str {
        match self {
            Period::Month(m) => MONTH_KEYS[((*m).clamp(1, 12) - 1) as usize],
            Period::Season(s) => s.as_key(),
        }
    }

    /// 从配置/用户输入解析期间键
    ///
    /// 支持: 季节英文/德文名称、月份英文全称/三字母缩写、德文月份名
    pub fn from_key(s: &str) -> Option<Self> {
        if let Some(season) = Season::parse(s) {
            return Some(Period::Season(season));
        }

        let lower = s.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        let is_abbrev = lower.chars().count() == 3;

        for (idx, key) in MONTH_KEYS.iter().enumerate() {
            let en = key.to_lowercase();
            if lower == en || (is_abbrev && en.starts_with(&lower)) {
                return Some(Period::Month(idx as u32 + 1));
            }
        }

        MONTH_NAMES_DE
            .iter()
            .position(|name| *name == lower || (is_abbrev && name.starts_with(&lower)))
            .map(|idx| Period::Month(idx as u32 + 1))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ==========================================
// 期间模式 (Period Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodMode {
    Month,  // 按自然月
    Season, // 按季节周表
}

impl fmt::Display for PeriodMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodMode::Month => write!(f, "month"),
            PeriodMode::Season => write!(f, "season"),
        }
    }
}

// ==========================================
// 销售速率口径 (Sales Rate Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesRateMode {
    Latest,       // 仅取当前周销量
    TrailingMean, // 最近 k 周均值（缺失周按 0 计）
}

impl fmt::Display for SalesRateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SalesRateMode::Latest => write!(f, "latest"),
            SalesRateMode::TrailingMean => write!(f, "trailing_mean"),
        }
    }
}

// ==========================================
// 比较策略 (Comparison Policy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPolicy {
    AbsoluteGap,  // coverage - target
    Ratio,        // coverage / target
    CoverageOnly, // coverage 本身（不依赖目标值）
}

impl ComparisonPolicy {
    /// 是否需要目标周转
    pub fn requires_target(&self) -> bool {
        !matches!(self, ComparisonPolicy::CoverageOnly)
    }
}

impl fmt::Display for ComparisonPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonPolicy::AbsoluteGap => write!(f, "absolute_gap"),
            ComparisonPolicy::Ratio => write!(f, "ratio"),
            ComparisonPolicy::CoverageOnly => write!(f, "coverage_only"),
        }
    }
}

// ==========================================
// 零销量处理策略 (Zero Sales Policy)
// ==========================================
// 零销量可能是新品/在途，也可能是滞销；由调用方显式选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroSalesPolicy {
    ReviewRequired,   // 输出"销售数据不足"，人工复核
    TreatAsOverstock, // 视为积压，直接给最高降价档
}

impl fmt::Display for ZeroSalesPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroSalesPolicy::ReviewRequired => write!(f, "review_required"),
            ZeroSalesPolicy::TreatAsOverstock => write!(f, "treat_as_overstock"),
        }
    }
}

// ==========================================
// 周键 (Week Key)
// ==========================================
// ISO 年 + ISO 周；year 缺失时仅在同一未知年内按 52 周回绕
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekKey {
    pub year: Option<i32>,
    pub week: u32,
}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Self {
        Self {
            year: Some(year),
            week,
        }
    }

    pub fn without_year(week: u32) -> Self {
        Self { year: None, week }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(y) => write!(f, "{}-W{:02}", y, self.week),
            None => write!(f, "W{:02}", self.week),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_parse_german_and_english() {
        assert_eq!(Season::parse("Frühling"), Some(Season::Spring));
        assert_eq!(Season::parse(" herbst "), Some(Season::Autumn));
        assert_eq!(Season::parse("SUMMER"), Some(Season::Summer));
        assert_eq!(Season::parse("Monsun"), None);
    }

    #[test]
    fn test_period_from_key() {
        assert_eq!(Period::from_key("WINTER"), Some(Period::Season(Season::Winter)));
        assert_eq!(Period::from_key("march"), Some(Period::Month(3)));
        assert_eq!(Period::from_key("Dez"), Some(Period::Month(12)));
        assert_eq!(Period::from_key("Oktober"), Some(Period::Month(10)));
        assert_eq!(Period::from_key(""), None);
    }

    #[test]
    fn test_period_key_round_trip_for_all_months() {
        for m in 1..=12 {
            let p = Period::Month(m);
            assert_eq!(Period::from_key(p.key()), Some(p));
        }
    }

    #[test]
    fn test_policy_serde_names() {
        let json = serde_json::to_string(&ComparisonPolicy::AbsoluteGap).unwrap();
        assert_eq!(json, "\"absolute_gap\"");
        let parsed: ZeroSalesPolicy = serde_json::from_str("\"treat_as_overstock\"").unwrap();
        assert_eq!(parsed, ZeroSalesPolicy::TreatAsOverstock);
    }
}
