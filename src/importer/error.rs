// ==========================================
// Merchify 动态降价引擎 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 缺少必需列 → 整批终止；单行问题走 DQ 报告，不终止
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 列结构错误 =====
    #[error("缺少必需列: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    // ===== 数据映射错误 =====
    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("日期格式错误 (行 {row}, 字段 {field}): 期望 YYYY-MM-DD / DD.MM.YYYY / YYYYMMDD，实际 {value}")]
    DateFormatError {
        row: usize,
        field: String,
        value: String,
    },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 出错字段（行级错误才有）
    pub fn field(&self) -> Option<&str> {
        match self {
            ImportError::TypeConversionError { field, .. }
            | ImportError::DateFormatError { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
