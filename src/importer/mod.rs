// ==========================================
// Merchify 动态降价引擎 - 导入层
// ==========================================
// 职责: POS 周数据导入，生成内存批次
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod article_importer;
pub mod article_importer_trait;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use article_importer::ArticleImporterImpl;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ColumnMapping, FieldMapper as FieldMapperImpl};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};

// 重导出 Trait 接口
pub use article_importer_trait::{
    ArticleImporter, DataCleaner, DqValidator, FieldMapper, FileParser, RawRow, RawTable,
};
