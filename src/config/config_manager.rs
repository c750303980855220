// ==========================================
// Merchify 动态降价引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、快照、显式修改、持久化到 JSON 文件
// 红线: 分析运行期间配置快照不可变；修改先校验后生效，版本号 +1
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::pricing_config::PricingConfig;
use crate::config::season_table::SeasonBoundaries;
use crate::config::tier_rules::TierRuleSet;
use crate::domain::types::{PeriodMode, SalesRateMode, ZeroSalesPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    current: RwLock<Arc<PricingConfig>>,
    path: Option<PathBuf>,
}

impl ConfigManager {
    /// 使用给定配置创建（先校验）
    pub fn new(config: PricingConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(config)),
            path: None,
        })
    }

    /// 使用内置默认配置创建
    pub fn with_defaults() -> Self {
        Self {
            current: RwLock::new(Arc::new(PricingConfig::default())),
            path: None,
        }
    }

    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = PricingConfig::from_json_str(&raw)?;

        info!(
            path = %path.display(),
            version = config.version,
            policy = %config.tier_rules.policy,
            "配置加载完成"
        );

        Ok(Self {
            current: RwLock::new(Arc::new(config)),
            path: Some(path.to_path_buf()),
        })
    }

    /// 文件存在则加载，否则使用默认配置并绑定该路径（save 时写入）
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!(path = %path.display(), "配置文件不存在，使用默认配置");
        let mut manager = Self::with_defaults();
        manager.path = Some(path.to_path_buf());
        Ok(manager)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 获取当前配置快照（调用方持有期间不受后续修改影响）
    pub fn snapshot(&self) -> ConfigResult<Arc<PricingConfig>> {
        let guard = self
            .current
            .read()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
        Ok(Arc::clone(&guard))
    }

    pub fn version(&self) -> ConfigResult<u64> {
        Ok(self.snapshot()?.version)
    }

    /// 获取配置快照 JSON（用于导出/回滚）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        self.snapshot()?.to_json_pretty()
    }

    /// 从 JSON 快照恢复配置
    ///
    /// 恢复后的版本号 = max(当前版本, 快照版本) + 1，保证单调递增
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<u64> {
        let restored = PricingConfig::from_json_str(snapshot_json)?;
        self.update(|config| {
            let version = config.version.max(restored.version);
            *config = restored;
            config.version = version;
            Ok(())
        })
    }

    // ===== 显式修改操作 =====

    /// 设置 (品类, 期间) 目标周转
    pub fn set_target(&self, category: &str, period_key: &str, target: f64) -> ConfigResult<u64> {
        self.update(|config| config.targets.set(category, period_key, target))
    }

    /// 删除 (品类, 期间) 目标周转
    pub fn remove_target(&self, category: &str, period_key: &str) -> ConfigResult<u64> {
        self.update(|config| config.targets.remove(category, period_key).map(|_| ()))
    }

    /// 设置默认目标（None 表示未命中时输出"无目标"）
    pub fn set_default_target(&self, default_target: Option<f64>) -> ConfigResult<u64> {
        self.update(|config| config.targets.set_default(default_target))
    }

    pub fn set_tier_rules(&self, rules: TierRuleSet) -> ConfigResult<u64> {
        self.update(|config| {
            config.tier_rules = rules;
            Ok(())
        })
    }

    pub fn set_season_boundaries(&self, boundaries: SeasonBoundaries) -> ConfigResult<u64> {
        self.update(|config| {
            config.season_boundaries = boundaries;
            Ok(())
        })
    }

    pub fn set_period_mode(&self, mode: PeriodMode) -> ConfigResult<u64> {
        self.update(|config| {
            config.period_mode = mode;
            Ok(())
        })
    }

    pub fn set_sales_rate_mode(&self, mode: SalesRateMode, trailing_window: usize) -> ConfigResult<u64> {
        self.update(|config| {
            config.sales_rate_mode = mode;
            config.trailing_window = trailing_window;
            Ok(())
        })
    }

    pub fn set_zero_sales_policy(&self, policy: ZeroSalesPolicy) -> ConfigResult<u64> {
        self.update(|config| {
            config.zero_sales_policy = policy;
            Ok(())
        })
    }

    pub fn set_default_year(&self, year: Option<i32>) -> ConfigResult<u64> {
        self.update(|config| {
            config.default_year = year;
            Ok(())
        })
    }

    /// 保存到绑定路径
    pub fn save(&self) -> ConfigResult<()> {
        let path = self.path.as_ref().ok_or_else(|| {
            ConfigError::InvalidConfiguration("未绑定配置文件路径".to_string())
        })?;
        self.save_to(path)
    }

    /// 保存到指定路径
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let json = self.get_config_snapshot()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::FileWriteError {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
            }
        }

        fs::write(path, json).map_err(|e| ConfigError::FileWriteError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        info!(path = %path.display(), "配置已保存");
        Ok(())
    }

    /// 复制-修改-校验-替换
    fn update<F>(&self, mutate: F) -> ConfigResult<u64>
    where
        F: FnOnce(&mut PricingConfig) -> ConfigResult<()>,
    {
        let mut guard = self
            .current
            .write()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;

        let mut next = PricingConfig::clone(&guard);
        mutate(&mut next)?;
        next.validate()?;
        next.version = guard.version.max(next.version) + 1;

        let version = next.version;
        *guard = Arc::new(next);

        info!(version, "配置已更新");
        Ok(version)
    }
}

/// 获取默认配置文件路径
///
/// 优先级:
/// 1. 环境变量 MERCHIFY_CONFIG
/// 2. 系统配置目录/merchify/pricing.json
/// 3. 当前目录 pricing.json
pub fn get_default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("MERCHIFY_CONFIG") {
        if !p.trim().is_empty() {
            return PathBuf::from(p);
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("merchify").join("pricing.json"),
        None => PathBuf::from("pricing.json"),
    }
}
