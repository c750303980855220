// ==========================================
// Merchify 动态降价引擎 - 商品周记录
// ==========================================
// 职责: 导入中间结构、校验后的商品记录、数据质量报告
// 生命周期: 每次上传构建一次，批次结束即丢弃（不落库）
// ==========================================

use crate::domain::types::WeekKey;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// RawArticleRecord - 导入中间结构
// ==========================================
// 用途: 字段映射后、校验前的行记录，所有字段可缺失
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawArticleRecord {
    pub article_id: Option<String>,     // 商品号 / SKU
    pub category: Option<String>,       // 品类
    pub year: Option<i32>,              // 年
    pub week: Option<u32>,              // 日历周 (KW)
    pub date: Option<NaiveDate>,        // 日期
    pub stock_on_hand: Option<f64>,     // 库存 (Lagerbestand)
    pub sales_qty: Option<f64>,         // 当期销量 (Verkäufe)
    pub unit_price: Option<f64>,        // 单价
    pub unit_cost: Option<f64>,         // 单位成本（仅用于毛利展示）
    pub row_number: usize,              // 源文件行号
}

// ==========================================
// ArticleRecord - 商品周记录
// ==========================================
// 不变量: stock_on_hand >= 0, sales_qty >= 0, week/date 至少一个存在
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub article_id: String,
    pub category: String,
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub date: Option<NaiveDate>,
    pub stock_on_hand: f64,
    pub sales_qty: f64,
    pub unit_price: Option<f64>,
    pub unit_cost: Option<f64>,
    pub row_number: usize,
}

impl ArticleRecord {
    /// 解析行的周键
    ///
    /// 优先级:
    /// 1. 显式 KW 列 + 年列
    /// 2. 显式 KW 列 + 日期所在 ISO 年
    /// 3. 显式 KW 列 + default_year
    /// 4. 日期推导 ISO 年/周
    /// 5. 仅 KW 列（无年份）
    pub fn week_key(&self, default_year: Option<i32>) -> Option<WeekKey> {
        match (self.week, self.date) {
            (Some(week), date) => {
                let year = self
                    .year
                    .or_else(|| date.map(|d| d.iso_week().year()))
                    .or(default_year);
                Some(WeekKey { year, week })
            }
            (None, Some(date)) => {
                let iso = date.iso_week();
                Some(WeekKey::new(iso.year(), iso.week()))
            }
            (None, None) => None,
        }
    }
}

// ==========================================
// DqLevel - 数据质量级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,   // 错误（行被阻断，不参与计算）
    Warning, // 警告（参与计算）
    Info,    // 提示（仅记录）
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,
    pub article_id: Option<String>,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

// ==========================================
// DqSummary / DqReport
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize, // 总行数
    pub accepted: usize,   // 进入计算
    pub blocked: usize,    // 阻断（ERROR）
    pub warning: usize,    // 警告条数
    pub info: usize,       // 提示条数
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqReport {
    pub batch_id: String,
    pub summary: DqSummary,
    pub violations: Vec<DqViolation>,
}

impl DqReport {
    /// 行是否存在 ERROR 级违规
    pub fn is_blocked(&self, row_number: usize) -> bool {
        self.violations
            .iter()
            .any(|v| v.row_number == row_number && v.level == DqLevel::Error)
    }
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub records: Vec<ArticleRecord>,
    pub dq_report: DqReport,
    pub elapsed_time: Duration,
}
