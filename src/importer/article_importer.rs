// ==========================================
// Merchify 动态降价引擎 - 商品数据导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到内存批次
// 流程: 解析 → 列检查 → 映射 → DQ 校验 → 过滤阻断行
// 红线: 缺少必需列时整批终止；行级问题只阻断该行
// ==========================================

use crate::domain::article::{ArticleRecord, DqLevel, DqViolation, ImportOutcome, RawArticleRecord};
use crate::importer::article_importer_trait::{
    ArticleImporter, DqValidator, FieldMapper, FileParser, RawTable,
};
use crate::importer::dq_validator::DqValidator as DqValidatorImpl;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{ColumnMapping, FieldMapper as FieldMapperImpl};
use crate::importer::file_parser::UniversalFileParser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ArticleImporterImpl - 商品数据导入器实现
// ==========================================
pub struct ArticleImporterImpl {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    dq_validator: Box<dyn DqValidator>,
}

impl Default for ArticleImporterImpl {
    fn default() -> Self {
        Self::with_mapping(ColumnMapping::default())
    }
}

impl ArticleImporterImpl {
    pub fn new(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        dq_validator: Box<dyn DqValidator>,
    ) -> Self {
        Self {
            file_parser,
            field_mapper,
            dq_validator,
        }
    }

    /// 默认组件 + 自定义列映射
    pub fn with_mapping(mapping: ColumnMapping) -> Self {
        Self::new(
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl::new(mapping)),
            Box::new(DqValidatorImpl),
        )
    }

    /// 处理已解析的表（文件导入与内存导入共用）
    pub fn import_table(&self, file_name: Option<String>, table: RawTable) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let total_rows = table.rows.len();

        // === 步骤 1: 列检查 ===
        self.field_mapper.check_columns(&table.headers)?;

        // === 步骤 2: 字段映射 ===
        debug!("步骤 2: 字段映射");
        let mut raw_records = Vec::with_capacity(total_rows);
        let mut violations: Vec<DqViolation> = Vec::new();
        for row in &table.rows {
            match self.field_mapper.map_to_raw_article(row) {
                Ok(record) => raw_records.push(record),
                Err(e) => {
                    warn!(row_number = row.row_number, error = %e, "字段映射失败");
                    violations.push(DqViolation {
                        row_number: row.row_number,
                        article_id: None,
                        level: DqLevel::Error,
                        field: e.field().unwrap_or("row").to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        // === 步骤 3: DQ 校验 ===
        debug!("步骤 3: DQ 校验");
        for record in &raw_records {
            violations.extend(self.dq_validator.validate_record(record));
        }
        let dq_report = self
            .dq_validator
            .generate_dq_report(batch_id.clone(), total_rows, violations);

        // === 步骤 4: 过滤阻断行 ===
        let records: Vec<ArticleRecord> = raw_records
            .into_iter()
            .filter(|r| !dq_report.is_blocked(r.row_number))
            .filter_map(to_article_record)
            .collect();

        let elapsed_time = start_time.elapsed();
        info!(
            batch_id = %batch_id,
            total = total_rows,
            accepted = records.len(),
            blocked = dq_report.summary.blocked,
            warning = dq_report.summary.warning,
            elapsed_ms = elapsed_time.as_millis() as u64,
            "商品数据导入完成"
        );

        Ok(ImportOutcome {
            batch_id,
            file_name,
            records,
            dq_report,
            elapsed_time,
        })
    }
}

/// 校验通过的中间结构 → ArticleRecord
fn to_article_record(raw: RawArticleRecord) -> Option<ArticleRecord> {
    Some(ArticleRecord {
        article_id: raw.article_id?,
        category: raw.category?,
        year: raw.year,
        week: raw.week,
        date: raw.date,
        stock_on_hand: raw.stock_on_hand?,
        sales_qty: raw.sales_qty?,
        unit_price: raw.unit_price,
        unit_cost: raw.unit_cost,
        row_number: raw.row_number,
    })
}

#[async_trait::async_trait]
impl ArticleImporter for ArticleImporterImpl {
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    async fn import_file(&self, file_path: &Path) -> ImportResult<ImportOutcome> {
        info!("开始导入商品数据");

        // === 步骤 1: 解析文件 ===
        let table = self.file_parser.parse_to_raw_table(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        info!(total_rows = table.rows.len(), "文件解析完成");

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        self.import_table(file_name, table)
    }

    async fn batch_import(&self, file_paths: Vec<PathBuf>) -> Vec<Result<ImportOutcome, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        let import_tasks = file_paths.iter().map(|path| async move {
            match self.import_file(path).await {
                Ok(outcome) => {
                    info!(
                        file = %path.display(),
                        accepted = outcome.dq_report.summary.accepted,
                        "文件导入成功"
                    );
                    Ok(outcome)
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "文件导入失败");
                    Err(format!("文件 {} 导入失败: {}", path.display(), e))
                }
            }
        });

        // 并发执行所有导入任务
        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;
    use crate::importer::file_parser::CsvParser;

    #[test]
    fn test_import_table_blocks_bad_rows() {
        let table = CsvParser
            .parse_str(
                "SKU;Kategorie;KW;Jahr;Lagerbestand;Verkäufe\n\
                 A-1;Jacken;7;2025;100;10\n\
                 A-2;Jacken;7;2025;-5;10\n\
                 A-3;Jacken;7;2025;viele;10\n",
            )
            .unwrap();
        let outcome = ArticleImporterImpl::default()
            .import_table(None, table)
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].article_id, "A-1");
        assert_eq!(outcome.dq_report.summary.total_rows, 3);
        assert_eq!(outcome.dq_report.summary.blocked, 2);
        assert!(outcome.dq_report.is_blocked(4));
    }

    #[test]
    fn test_import_table_missing_columns_halts() {
        let table = CsvParser.parse_str("SKU,Lagerbestand\nA-1,10\n").unwrap();
        let result = ArticleImporterImpl::default().import_table(None, table);
        assert!(matches!(result, Err(ImportError::MissingColumns { .. })));
    }
}
