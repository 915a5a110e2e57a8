// ==========================================
// 学校管理系统 - 导入层
// ==========================================
// 职责: 上传文件 → 校验 → 整批落库 → 逐行错误报告
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod columns;
pub mod conflict_handler;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod field_validator;
pub mod file_parser;
pub mod student_importer_impl;
pub mod student_importer_trait;
pub mod template;

// 重导出核心类型
pub use conflict_handler::BatchKeyIndex;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{FieldViolation, ImportError, ImporterResult};
pub use field_mapper::{FieldMapper as FieldMapperImpl, StudentDraft};
pub use field_validator::FieldValidator as FieldValidatorImpl;
pub use file_parser::{CsvParser, ExcelParser, FileFormat, UniversalFileParser};
pub use student_importer_impl::StudentImporterImpl;
pub use template::ImportTemplate;

// 重导出 Trait 接口
pub use student_importer_trait::{
    DataCleaner, FieldMapper, FieldValidator, FileParser, StudentImporter,
};
