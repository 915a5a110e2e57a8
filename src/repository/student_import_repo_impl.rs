// ==========================================
// 学校管理系统 - 学生导入 Repository 实现
// ==========================================
// 职责: 基于 StudentRepository / GuardianRepository 实现导入协作者接口
// ==========================================

use crate::domain::student::{Guardian, Student};
use crate::repository::error::RepositoryResult;
use crate::repository::guardian_repo::GuardianRepository;
use crate::repository::student_import_repo::StudentImportRepository;
use crate::repository::student_repo::StudentRepository;
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub struct StudentImportRepositoryImpl {
    student_repo: Arc<StudentRepository>,
    guardian_repo: Arc<GuardianRepository>,
}

impl StudentImportRepositoryImpl {
    pub fn new(student_repo: Arc<StudentRepository>, guardian_repo: Arc<GuardianRepository>) -> Self {
        Self {
            student_repo,
            guardian_repo,
        }
    }

    /// 从共享连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            Arc::new(StudentRepository::from_connection(conn.clone())),
            Arc::new(GuardianRepository::from_connection(conn)),
        )
    }
}

#[async_trait]
impl StudentImportRepository for StudentImportRepositoryImpl {
    async fn find_student_by_nis(&self, nis: &str) -> RepositoryResult<Option<Student>> {
        self.student_repo.find_by_nis(nis)
    }

    async fn find_student_by_nisn(&self, nisn: &str) -> RepositoryResult<Option<Student>> {
        self.student_repo.find_by_nisn(nisn)
    }

    async fn find_guardian_by_id(&self, guardian_id: &str) -> RepositoryResult<Option<Guardian>> {
        self.guardian_repo.find_active_by_id(guardian_id)
    }

    async fn bulk_insert_students(&self, students: Vec<Student>) -> RepositoryResult<usize> {
        self.student_repo.batch_insert(&students)
    }
}
