// ==========================================
// 学校管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、导入结果结构
// 红线: 不含数据访问逻辑
// ==========================================

pub mod import;
pub mod student;
pub mod types;

// 重导出核心类型
pub use import::{
    CellValue, ImportErrorEntry, ImportErrorKind, ImportResult, ImportRow, ParsedSheet,
    ValidatedStudentRecord,
};
pub use student::{Guardian, Student};
pub use types::{Gender, StudentStatus};
