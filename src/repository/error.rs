// ==========================================
// 学校管理系统 - 仓储层错误类型
// ==========================================
// 约束违反按 SQLite 消息分类，并保留出错的 表.列
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    /// 唯一约束（student.nis / student.nisn）
    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    /// 外键约束（student.guardian_id → guardian）
    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 打开数据库失败
    pub fn connection(err: rusqlite::Error) -> Self {
        RepositoryError::DatabaseConnectionError(err.to_string())
    }
}

/// "UNIQUE constraint failed: student.nis" → "student.nis"
fn constraint_target(msg: &str) -> String {
    msg.rsplit_once(": ")
        .map(|(_, target)| target.trim().to_string())
        .unwrap_or_else(|| msg.to_string())
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.starts_with("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(constraint_target(&msg))
                } else if msg.starts_with("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
