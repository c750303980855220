// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use merchify_pricing::config::{PricingConfig, TargetCoverageTable, TierRuleSet};
use merchify_pricing::domain::article::ArticleRecord;
use merchify_pricing::domain::types::{PeriodMode, SalesRateMode, ZeroSalesPolicy};

// ==========================================
// ArticleRecord 构建器
// ==========================================

pub struct ArticleBuilder {
    article_id: String,
    category: String,
    year: Option<i32>,
    week: Option<u32>,
    date: Option<NaiveDate>,
    stock_on_hand: f64,
    sales_qty: f64,
    unit_price: Option<f64>,
    unit_cost: Option<f64>,
    row_number: usize,
}

impl ArticleBuilder {
    pub fn new(article_id: &str) -> Self {
        Self {
            article_id: article_id.to_string(),
            category: "Jacken".to_string(),
            year: None,
            week: None,
            date: None,
            stock_on_hand: 0.0,
            sales_qty: 0.0,
            unit_price: None,
            unit_cost: None,
            row_number: 1,
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn week(mut self, year: i32, week: u32) -> Self {
        self.year = Some(year);
        self.week = Some(week);
        self
    }

    pub fn week_only(mut self, week: u32) -> Self {
        self.year = None;
        self.week = Some(week);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn stock(mut self, stock: f64) -> Self {
        self.stock_on_hand = stock;
        self
    }

    pub fn sales(mut self, sales: f64) -> Self {
        self.sales_qty = sales;
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.unit_cost = Some(cost);
        self
    }

    pub fn row(mut self, row_number: usize) -> Self {
        self.row_number = row_number;
        self
    }

    pub fn build(self) -> ArticleRecord {
        ArticleRecord {
            article_id: self.article_id,
            category: self.category,
            year: self.year,
            week: self.week,
            date: self.date,
            stock_on_hand: self.stock_on_hand,
            sales_qty: self.sales_qty,
            unit_price: self.unit_price,
            unit_cost: self.unit_cost,
            row_number: self.row_number,
        }
    }
}

/// 连续周的销量历史，最后一周带库存
///
/// 前几周库存记为 0，只有最后一周的库存参与判定
pub fn weekly_history(
    article_id: &str,
    category: &str,
    year: i32,
    last_week: u32,
    sales: &[f64],
    stock: f64,
) -> Vec<ArticleRecord> {
    let first_week = last_week + 1 - sales.len() as u32;
    sales
        .iter()
        .enumerate()
        .map(|(i, qty)| {
            let week = first_week + i as u32;
            let stock = if week == last_week { stock } else { 0.0 };
            ArticleBuilder::new(article_id)
                .category(category)
                .week(year, week)
                .stock(stock)
                .sales(*qty)
                .row(i + 2)
                .build()
        })
        .collect()
}

// ==========================================
// PricingConfig 构建器
// ==========================================

pub struct ConfigBuilder {
    config: PricingConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PricingConfig::default(),
        }
    }

    pub fn period_mode(mut self, mode: PeriodMode) -> Self {
        self.config.period_mode = mode;
        self
    }

    pub fn sales_rate_mode(mut self, mode: SalesRateMode, window: usize) -> Self {
        self.config.sales_rate_mode = mode;
        self.config.trailing_window = window;
        self
    }

    pub fn default_target(mut self, target: Option<f64>) -> Self {
        self.config
            .targets
            .set_default(target)
            .expect("default target should be valid");
        self
    }

    /// 清空目标表（含默认值）
    pub fn no_targets(mut self) -> Self {
        self.config.targets = TargetCoverageTable::new(None);
        self
    }

    pub fn target(mut self, category: &str, period_key: &str, target: f64) -> Self {
        self.config
            .targets
            .set(category, period_key, target)
            .expect("target cell should be valid");
        self
    }

    pub fn tier_rules(mut self, rules: TierRuleSet) -> Self {
        self.config.tier_rules = rules;
        self
    }

    pub fn zero_sales_policy(mut self, policy: ZeroSalesPolicy) -> Self {
        self.config.zero_sales_policy = policy;
        self
    }

    pub fn default_year(mut self, year: Option<i32>) -> Self {
        self.config.default_year = year;
        self
    }

    pub fn build(self) -> PricingConfig {
        self.config
            .validate()
            .expect("test config should be valid");
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
