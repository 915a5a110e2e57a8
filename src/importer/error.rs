// ==========================================
// 学校管理系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: Display 文本用于日志；面向用户的消息走 i18n（localized_message）
// ==========================================

use crate::domain::import::{ImportErrorEntry, ImportErrorKind};
use crate::i18n::t_in;
use crate::repository::error::RepositoryError;
use thiserror::Error;

// ==========================================
// FieldViolation - 字段校验失败原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldViolation {
    Required,
    MinLength(usize),
    InvalidUrl,
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件级错误（致命）=====
    #[error("文件为空: 未找到数据行")]
    EmptyFile,

    #[error("缺少必需列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 行级错误（跳过该行）=====
    #[error("日期格式错误 (字段 {field}): {value}")]
    DateFormat { field: String, value: String },

    #[error("性别取值错误: {value}")]
    GenderValue { value: String },

    #[error("字段校验失败 (字段 {field}, 值 {value}): {violation:?}")]
    FieldValidation {
        field: String,
        value: String,
        violation: FieldViolation,
    },

    #[error("NIS 重复: {nis} (批次内: {in_batch})")]
    DuplicateRegistrationId { nis: String, in_batch: bool },

    #[error("NISN 重复: {nisn} (批次内: {in_batch})")]
    DuplicateSecondaryId { nisn: String, in_batch: bool },

    #[error("监护人不存在: {guardian_id}")]
    GuardianNotFound { guardian_id: String },

    // ===== 落库错误（整批回滚）=====
    #[error("批量写入失败: {0}")]
    Commit(String),

    // ===== 基础设施错误 =====
    #[error("配置读取失败: {0}")]
    ConfigReadError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 对应的可序列化错误分类；基础设施错误返回 None
    pub fn kind(&self) -> Option<ImportErrorKind> {
        let kind = match self {
            ImportError::EmptyFile => ImportErrorKind::EmptyFile,
            ImportError::MissingColumns(_) => ImportErrorKind::MissingColumns,
            ImportError::UnsupportedFormat(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_) => ImportErrorKind::UnreadableFile,
            ImportError::DateFormat { .. } => ImportErrorKind::DateFormat,
            ImportError::GenderValue { .. } => ImportErrorKind::GenderValue,
            ImportError::FieldValidation { .. } => ImportErrorKind::FieldValidation,
            ImportError::DuplicateRegistrationId { .. } => ImportErrorKind::DuplicateRegistrationId,
            ImportError::DuplicateSecondaryId { .. } => ImportErrorKind::DuplicateSecondaryId,
            ImportError::GuardianNotFound { .. } => ImportErrorKind::GuardianNotFound,
            ImportError::Commit(_) => ImportErrorKind::Commit,
            ImportError::ConfigReadError(_)
            | ImportError::DatabaseQueryError(_)
            | ImportError::InternalError(_)
            | ImportError::Other(_) => return None,
        };
        Some(kind)
    }

    /// 出错列名（表头文本）
    pub fn field(&self) -> Option<&str> {
        use crate::importer::columns;
        match self {
            ImportError::DateFormat { field, .. } | ImportError::FieldValidation { field, .. } => {
                Some(field.as_str())
            }
            ImportError::GenderValue { .. } => Some(columns::GENDER),
            ImportError::DuplicateRegistrationId { .. } => Some(columns::NIS),
            ImportError::DuplicateSecondaryId { .. } => Some(columns::NISN),
            ImportError::GuardianNotFound { .. } => Some(columns::GUARDIAN_ID),
            _ => None,
        }
    }

    /// 出错的原始值；空值（如必填缺失）返回 None
    pub fn data(&self) -> Option<&str> {
        let value = match self {
            ImportError::DateFormat { value, .. }
            | ImportError::GenderValue { value }
            | ImportError::FieldValidation { value, .. } => Some(value.as_str()),
            ImportError::DuplicateRegistrationId { nis, .. } => Some(nis.as_str()),
            ImportError::DuplicateSecondaryId { nisn, .. } => Some(nisn.as_str()),
            ImportError::GuardianNotFound { guardian_id } => Some(guardian_id.as_str()),
            _ => None,
        };
        value.filter(|v| !v.is_empty())
    }

    /// 面向用户的本地化消息
    pub fn localized_message(&self, locale: &str) -> String {
        match self {
            ImportError::EmptyFile => t_in(locale, "import.empty_file", &[]),
            ImportError::MissingColumns(columns) => t_in(
                locale,
                "import.missing_columns",
                &[("columns", columns.join(", ").as_str())],
            ),
            ImportError::UnsupportedFormat(reason)
            | ImportError::ExcelParseError(reason)
            | ImportError::CsvParseError(reason) => {
                t_in(locale, "import.unreadable_file", &[("reason", reason.as_str())])
            }
            ImportError::DateFormat { field, value } => t_in(
                locale,
                "import.date_format",
                &[("field", field.as_str()), ("value", value.as_str())],
            ),
            ImportError::GenderValue { value } => {
                t_in(locale, "import.gender_value", &[("value", value.as_str())])
            }
            ImportError::FieldValidation {
                field, violation, ..
            } => match violation {
                FieldViolation::Required => t_in(locale, "import.required", &[("field", field.as_str())]),
                FieldViolation::MinLength(min) => t_in(
                    locale,
                    "import.min_length",
                    &[("field", field.as_str()), ("min", min.to_string().as_str())],
                ),
                FieldViolation::InvalidUrl => {
                    t_in(locale, "import.invalid_url", &[("field", field.as_str())])
                }
            },
            ImportError::DuplicateRegistrationId { nis, in_batch } => {
                let key = if *in_batch {
                    "import.duplicate_nis_batch"
                } else {
                    "import.duplicate_nis_store"
                };
                t_in(locale, key, &[("nis", nis.as_str())])
            }
            ImportError::DuplicateSecondaryId { nisn, in_batch } => {
                let key = if *in_batch {
                    "import.duplicate_nisn_batch"
                } else {
                    "import.duplicate_nisn_store"
                };
                t_in(locale, key, &[("nisn", nisn.as_str())])
            }
            ImportError::GuardianNotFound { guardian_id } => t_in(
                locale,
                "import.guardian_not_found",
                &[("guardian_id", guardian_id.as_str())],
            ),
            ImportError::Commit(reason) => {
                t_in(locale, "import.commit_failed", &[("reason", reason.as_str())])
            }
            other => other.to_string(),
        }
    }

    /// 转换为错误明细（行号 0 表示文件级）
    pub fn to_entry(&self, row: usize, locale: &str) -> ImportErrorEntry {
        ImportErrorEntry {
            row,
            field: self.field().map(str::to_string),
            message: self.localized_message(locale),
            data: self.data().map(str::to_string),
            kind: self.kind().unwrap_or(ImportErrorKind::Commit),
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseQueryError(err.to_string())
    }
}

// 实现 From<RepositoryError>
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        ImportError::DatabaseQueryError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_entry_carries_field_and_data() {
        let err = ImportError::GenderValue {
            value: "X".to_string(),
        };
        let entry = err.to_entry(4, "en");
        assert_eq!(entry.row, 4);
        assert_eq!(entry.field.as_deref(), Some("Gender"));
        assert_eq!(entry.data.as_deref(), Some("X"));
        assert_eq!(entry.kind, ImportErrorKind::GenderValue);
        assert!(entry.message.contains("X"));
    }

    #[test]
    fn test_missing_columns_message_lists_names() {
        let err = ImportError::MissingColumns(vec!["Address".to_string(), "NIS".to_string()]);
        let entry = err.to_entry(0, "en");
        assert_eq!(entry.kind, ImportErrorKind::MissingColumns);
        assert!(entry.message.contains("Address"));
        assert!(entry.message.contains("NIS"));
        assert!(entry.field.is_none());
    }

    #[test]
    fn test_infra_errors_have_no_kind() {
        assert!(ImportError::DatabaseQueryError("x".into()).kind().is_none());
        assert_eq!(
            ImportError::CsvParseError("x".into()).kind(),
            Some(ImportErrorKind::UnreadableFile)
        );
    }

    #[test]
    fn test_required_violation_leaves_data_unset() {
        let err = ImportError::FieldValidation {
            field: "Address".to_string(),
            value: String::new(),
            violation: FieldViolation::Required,
        };
        let entry = err.to_entry(2, "en");
        assert_eq!(entry.field.as_deref(), Some("Address"));
        assert!(entry.data.is_none());

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_unreadable_file_message_uses_reason_only() {
        let err = ImportError::CsvParseError("invalid utf-8 at line 3".to_string());
        assert_eq!(
            err.localized_message("en"),
            "The file could not be read: invalid utf-8 at line 3"
        );
        assert_eq!(
            err.localized_message("id"),
            "File tidak dapat dibaca: invalid utf-8 at line 3"
        );
    }

    #[test]
    fn test_min_length_message_in_indonesian() {
        let err = ImportError::FieldValidation {
            field: "Address".to_string(),
            value: "Jl".to_string(),
            violation: FieldViolation::MinLength(5),
        };
        let msg = err.localized_message("id");
        assert!(msg.contains("Address"));
        assert!(msg.contains('5'));
    }
}
