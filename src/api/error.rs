// ==========================================
// Merchify 动态降价引擎 - API层错误类型
// ==========================================
// 职责: 统一导入/配置/导出错误，转换为用户可读的错误消息
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::forecast::ForecastError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("缺少必需列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置非法: {0}")]
    InvalidConfiguration(String),

    #[error("配置读写失败: {0}")]
    ConfigIoError(String),

    // ==========================================
    // 输出错误
    // ==========================================
    #[error("导出失败: {0}")]
    ExportError(String),

    #[error("预测失败: {0}")]
    ForecastError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingColumns { missing } => ApiError::MissingColumns(missing),
            ImportError::FileNotFound(path) => ApiError::InvalidInput(format!("文件不存在: {}", path)),
            ImportError::UnsupportedFormat(ext) => {
                ApiError::InvalidInput(format!("文件格式不支持: {}", ext))
            }
            ImportError::Other(e) => ApiError::Other(e),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ConfigError 转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::FileReadError { .. } | ConfigError::FileWriteError { .. } => {
                ApiError::ConfigIoError(err.to_string())
            }
            ConfigError::LockPoisoned(msg) => ApiError::InternalError(msg),
            other => ApiError::InvalidConfiguration(other.to_string()),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        ApiError::ForecastError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
