// ==========================================
// 学校管理系统 - 学生导入 Repository Trait
// ==========================================
// 职责: 定义导入管道所需的持久化协作者接口
//       （唯一键查询 / 监护人查询 / 整批插入）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::student::{Guardian, Student};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// StudentImportRepository Trait
// ==========================================
// 实现者: StudentImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait StudentImportRepository: Send + Sync {
    /// 按 NIS 查询学生（包含已软删除记录）
    async fn find_student_by_nis(&self, nis: &str) -> RepositoryResult<Option<Student>>;

    /// 按 NISN 查询学生（包含已软删除记录）
    async fn find_student_by_nisn(&self, nisn: &str) -> RepositoryResult<Option<Student>>;

    /// 查询未删除的监护人
    async fn find_guardian_by_id(&self, guardian_id: &str) -> RepositoryResult<Option<Guardian>>;

    /// 整批插入学生（事务化）
    ///
    /// # 返回
    /// - Ok(usize): 实际插入的记录数
    /// - Err: 数据库错误（整个事务回滚，无任何记录落库）
    async fn bulk_insert_students(&self, students: Vec<Student>) -> RepositoryResult<usize>;
}
