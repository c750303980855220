// ==========================================
// Merchify 动态降价引擎 - 周转计算器
// ==========================================
// 职责: 库存 / 销售速率 → 周转周数 (Reichweite)
// 红线: 速率为 0 → Coverage::Undefined；不加 epsilon，不除零
// ==========================================

use crate::domain::decision::Coverage;

// ==========================================
// CoverageCalculator - 周转计算器
// ==========================================
pub struct CoverageCalculator;

impl CoverageCalculator {
    /// 滚动窗口均值速率
    ///
    /// 调用方负责把缺失周补 0 后传入；空窗口视为速率 0
    pub fn trailing_mean_rate(window_sales: &[f64]) -> f64 {
        if window_sales.is_empty() {
            return 0.0;
        }
        window_sales.iter().sum::<f64>() / window_sales.len() as f64
    }

    /// 周转周数 = 库存 / 速率
    pub fn weeks_of_coverage(stock_on_hand: f64, sales_rate: f64) -> Coverage {
        if sales_rate == 0.0 || !sales_rate.is_finite() {
            return Coverage::Undefined;
        }
        Coverage::Finite(stock_on_hand / sales_rate)
    }

    /// 单期销量口径
    pub fn from_latest(stock_on_hand: f64, latest_sales: f64) -> Coverage {
        Self::weeks_of_coverage(stock_on_hand, latest_sales)
    }

    /// 滚动窗口口径
    pub fn from_window(stock_on_hand: f64, window_sales: &[f64]) -> Coverage {
        Self::weeks_of_coverage(stock_on_hand, Self::trailing_mean_rate(window_sales))
    }
}
