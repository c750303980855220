// ==========================================
// Merchify 动态降价引擎 - 商品数据导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 列检查 → 字段映射 → 清洗 → DQ 校验
// ==========================================

use crate::domain::article::{DqReport, DqViolation, ImportOutcome, RawArticleRecord};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ==========================================
// RawRow / RawTable - 解析结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub row_number: usize,               // 源文件行号（表头为第 1 行）
    pub values: HashMap<String, String>, // 列名 → 原始文本
}

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// ArticleImporter Trait
// ==========================================
// 用途: 商品周数据导入主接口
// 实现者: ArticleImporterImpl
#[async_trait]
pub trait ArticleImporter: Send + Sync {
    /// 导入单个文件（.csv / .xlsx / .xls）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 通过校验的记录 + DQ 报告
    /// - Err: 文件级错误（文件不存在、格式不支持、缺少必需列）
    async fn import_file(&self, file_path: &Path) -> ImportResult<ImportOutcome>;

    /// 批量导入多个文件（并发执行）
    ///
    /// 每个文件独立导入，单个文件失败不影响其他文件
    async fn batch_import(&self, file_paths: Vec<PathBuf>) -> Vec<Result<ImportOutcome, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 行记录
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
pub trait FieldMapper: Send + Sync {
    /// 检查必需列是否齐全
    ///
    /// 缺任何一个 → ImportError::MissingColumns
    fn check_columns(&self, headers: &[String]) -> ImportResult<()>;

    /// 原始行 → RawArticleRecord（含类型转换）
    fn map_to_raw_article(&self, row: &RawRow) -> ImportResult<RawArticleRecord>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
pub trait DataCleaner: Send + Sync {
    /// 空白 → None，否则去首尾空白
    fn normalize_null(&self, value: Option<&str>) -> Option<String>;

    /// 数值解析，支持小数逗号 ("12,5") 与千分位
    fn parse_number(&self, value: &str) -> Option<f64>;

    /// 日期解析: YYYY-MM-DD / DD.MM.YYYY / YYYYMMDD
    fn parse_date(&self, value: &str) -> Option<NaiveDate>;
}

// ==========================================
// DqValidator Trait
// ==========================================
pub trait DqValidator: Send + Sync {
    /// 单行校验
    fn validate_record(&self, record: &RawArticleRecord) -> Vec<DqViolation>;

    /// 汇总 DQ 报告
    fn generate_dq_report(
        &self,
        batch_id: String,
        total_rows: usize,
        violations: Vec<DqViolation>,
    ) -> DqReport;
}
