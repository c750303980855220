// ==========================================
// Merchify 动态降价引擎 - 配置错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 非法配置在加载/更新时拒绝，不得进入降价引擎
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    // ===== 文件相关错误 =====
    #[error("配置文件读取失败 ({path}): {message}")]
    FileReadError { path: String, message: String },

    #[error("配置文件写入失败 ({path}): {message}")]
    FileWriteError { path: String, message: String },

    #[error("配置解析失败: {0}")]
    ParseError(String),

    // ===== 校验错误 =====
    #[error("降价阈值必须严格递减 (位置 {index}: {previous} -> {current})")]
    NonMonotonicThresholds {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("目标周转非法 (品类 {category}, 期间 {period}): {message}")]
    InvalidTarget {
        category: String,
        period: String,
        message: String,
    },

    #[error("季节周表非法: {0}")]
    InvalidSeasonBoundaries(String),

    #[error("滚动窗口非法: k={0}（必须 >= 1）")]
    InvalidTrailingWindow(usize),

    #[error("配置非法: {0}")]
    InvalidConfiguration(String),

    // ===== 并发错误 =====
    #[error("配置锁获取失败: {0}")]
    LockPoisoned(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
