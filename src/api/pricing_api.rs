// ==========================================
// Merchify 动态降价引擎 - 定价 API
// ==========================================
// 职责: 导入 → 分析 → 导出 的统一入口；配置修改透传 ConfigManager
// 红线: 每次分析只取一个配置快照
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::export::CsvExporter;
use crate::config::{ConfigManager, TierRuleSet};
use crate::domain::article::{ArticleRecord, DqLevel, DqReport};
use crate::domain::decision::AnalysisBatch;
use crate::domain::types::ZeroSalesPolicy;
use crate::engine::forecast::{attach_forecasts, observations_from_records, ForecastPredictor};
use crate::engine::orchestrator::MarkdownOrchestrator;
use crate::importer::{ArticleImporter, ArticleImporterImpl, ColumnMapping, DqValidatorImpl};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 单文件分析结果（DQ 报告 + 标注批次）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub file_name: Option<String>,
    pub dq_report: DqReport,
    pub batch: AnalysisBatch,
}

/// 多文件分析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiFileReport {
    pub dq_reports: Vec<DqReport>,
    pub failed_files: Vec<String>,
    pub batch: AnalysisBatch,
}

// ==========================================
// PricingApi
// ==========================================
pub struct PricingApi {
    config_manager: Arc<ConfigManager>,
    importer: ArticleImporterImpl,
}

impl PricingApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self::with_mapping(config_manager, ColumnMapping::default())
    }

    /// 自定义列映射
    pub fn with_mapping(config_manager: Arc<ConfigManager>, mapping: ColumnMapping) -> Self {
        Self {
            config_manager,
            importer: ArticleImporterImpl::with_mapping(mapping),
        }
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    // ==========================================
    // 分析
    // ==========================================

    /// 对内存记录执行分析
    ///
    /// 内存记录不经过导入 DQ，这里按同一套规则校验；
    /// 任一行违反 ERROR 级规则则整批拒绝
    ///
    /// # 错误
    /// - ApiError::InvalidInput: 列出所有违规行号
    pub fn analyze_records(&self, records: &[ArticleRecord]) -> ApiResult<AnalysisBatch> {
        let snapshot = self.config_manager.snapshot()?;

        let blocked = DqValidatorImpl.blocked_rows(records, snapshot.default_year);
        if !blocked.is_empty() {
            warn!(blocked_rows = blocked.len(), "内存记录未通过校验，拒绝分析");
            let rows: Vec<String> = blocked.iter().map(|r| r.to_string()).collect();
            return Err(ApiError::InvalidInput(format!(
                "记录违反数据约束 (库存/销量须为非负有限数，KW 或日期至少一个，KW 须存在于该年)，行: {}",
                rows.join(", ")
            )));
        }

        Ok(MarkdownOrchestrator::new(snapshot).run(records))
    }

    /// 分析已通过导入 DQ 的记录
    ///
    /// 导入时还不知道 default_year，回退年份后 KW 不存在的行在此排除并告警
    fn analyze_imported(&self, records: Vec<ArticleRecord>) -> ApiResult<AnalysisBatch> {
        let snapshot = self.config_manager.snapshot()?;
        let default_year = snapshot.default_year;

        let total = records.len();
        let kept: Vec<ArticleRecord> = records
            .into_iter()
            .filter(|record| {
                !DqValidatorImpl
                    .validate_article(record, default_year)
                    .iter()
                    .any(|v| v.level == DqLevel::Error)
            })
            .collect();
        if kept.len() < total {
            warn!(
                excluded = total - kept.len(),
                default_year = ?default_year,
                "回退年份后 KW 不存在于该年，已排除"
            );
        }

        Ok(MarkdownOrchestrator::new(snapshot).run(&kept))
    }

    /// 导入并分析单个文件
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn analyze_file<P: AsRef<Path>>(&self, path: P) -> ApiResult<AnalysisReport> {
        let outcome = self.importer.import_file(path.as_ref()).await?;
        if outcome.dq_report.summary.blocked > 0 {
            warn!(
                blocked = outcome.dq_report.summary.blocked,
                "部分行未通过数据质量校验，已排除"
            );
        }

        let batch = self.analyze_imported(outcome.records)?;
        Ok(AnalysisReport {
            file_name: outcome.file_name,
            dq_report: outcome.dq_report,
            batch,
        })
    }

    /// 并发导入多个文件，合并为一个批次分析
    ///
    /// 单个文件失败不影响其他文件；全部失败时返回错误
    pub async fn analyze_files(&self, paths: Vec<PathBuf>) -> ApiResult<MultiFileReport> {
        let results = self.importer.batch_import(paths).await;

        let mut records = Vec::new();
        let mut dq_reports = Vec::new();
        let mut failed_files = Vec::new();
        for result in results {
            match result {
                Ok(outcome) => {
                    records.extend(outcome.records);
                    dq_reports.push(outcome.dq_report);
                }
                Err(msg) => failed_files.push(msg),
            }
        }

        if dq_reports.is_empty() {
            return Err(ApiError::ImportError(failed_files.join("; ")));
        }

        let batch = self.analyze_imported(records)?;
        info!(
            files = dq_reports.len(),
            failed = failed_files.len(),
            rows = batch.rows.len(),
            "多文件分析完成"
        );

        Ok(MultiFileReport {
            dq_reports,
            failed_files,
            batch,
        })
    }

    /// 用批次自身的销量历史训练预测器，并写入预测值
    pub fn forecast(
        &self,
        batch: &mut AnalysisBatch,
        predictor: &mut dyn ForecastPredictor,
        horizon_weeks: u32,
    ) -> ApiResult<usize> {
        let default_year = self.config_manager.snapshot()?.default_year;
        let records: Vec<ArticleRecord> = batch.rows.iter().map(|r| r.record.clone()).collect();
        predictor.train(&observations_from_records(&records, default_year))?;
        Ok(attach_forecasts(batch, predictor, horizon_weeks))
    }

    // ==========================================
    // 导出
    // ==========================================

    pub fn export_csv<W: Write>(&self, batch: &AnalysisBatch, writer: W) -> ApiResult<usize> {
        CsvExporter::default().write(batch, writer)
    }

    pub fn export_csv_to_path<P: AsRef<Path>>(&self, batch: &AnalysisBatch, path: P) -> ApiResult<usize> {
        CsvExporter::default().write_to_path(batch, path)
    }

    // ==========================================
    // 配置修改（透传，返回新版本号）
    // ==========================================

    pub fn set_target(&self, category: &str, period_key: &str, target: f64) -> ApiResult<u64> {
        Ok(self.config_manager.set_target(category, period_key, target)?)
    }

    pub fn remove_target(&self, category: &str, period_key: &str) -> ApiResult<u64> {
        Ok(self.config_manager.remove_target(category, period_key)?)
    }

    pub fn set_default_target(&self, default_target: Option<f64>) -> ApiResult<u64> {
        Ok(self.config_manager.set_default_target(default_target)?)
    }

    pub fn set_tier_rules(&self, rules: TierRuleSet) -> ApiResult<u64> {
        Ok(self.config_manager.set_tier_rules(rules)?)
    }

    pub fn set_zero_sales_policy(&self, policy: ZeroSalesPolicy) -> ApiResult<u64> {
        Ok(self.config_manager.set_zero_sales_policy(policy)?)
    }

    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        Ok(self.config_manager.get_config_snapshot()?)
    }

    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ApiResult<u64> {
        Ok(self.config_manager.restore_config_from_snapshot(snapshot_json)?)
    }

    pub fn save_config(&self) -> ApiResult<()> {
        Ok(self.config_manager.save()?)
    }
}
