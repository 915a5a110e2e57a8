// ==========================================
// 学校管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/导入错误为用户友好的错误消息
// ==========================================

use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 字段校验失败（field 为表单/表头字段名）
    #[error("数据验证失败 (field={field}): {message}")]
    ValidationError { field: String, message: String },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(target) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", target))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
// 单条录入复用导入校验器，行级错误在此转为 ValidationError
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err.kind() {
            Some(kind) if kind.is_row_scoped() => ApiError::ValidationError {
                field: err.field().unwrap_or_default().to_string(),
                message: err.localized_message(&crate::i18n::current_locale()),
            },
            Some(_) => ApiError::ImportError(err.to_string()),
            None => match err {
                ImportError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
                ImportError::Other(e) => ApiError::Other(e),
                other => ApiError::InternalError(other.to_string()),
            },
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_business_rule() {
        let err: ApiError =
            RepositoryError::UniqueConstraintViolation("student.nis".to_string()).into();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_row_error_maps_to_validation_error() {
        let err: ApiError = ImportError::GenderValue {
            value: "X".to_string(),
        }
        .into();
        match err {
            ApiError::ValidationError { field, .. } => assert_eq!(field, "Gender"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
