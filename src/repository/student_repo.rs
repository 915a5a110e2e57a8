// ==========================================
// 学校管理系统 - 学生档案仓储
// ==========================================
// 职责: student 表 CRUD（软删除通过 deleted_at）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 约束: 所有查询使用参数化
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::student::Student;
use crate::domain::types::{Gender, StudentStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

const STUDENT_COLUMNS: &str = "student_id, nis, nisn, full_name, gender, date_of_birth, \
     place_of_birth, address, phone, photo_url, guardian_id, enrollment_date, status, \
     created_at, updated_at, deleted_at";

// ==========================================
// StudentFilter - 列表查询条件
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// 按监护人过滤
    pub guardian_id: Option<String>,
    /// 姓名 / NIS / NISN 模糊匹配
    pub search: Option<String>,
    /// 是否包含已软删除记录
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// ==========================================
// StudentRepository
// ==========================================
pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    /// 创建新的 StudentRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(RepositoryError::connection)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入单个学生
    pub fn insert(&self, student: &Student) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, student)?;
        Ok(())
    }

    /// 批量插入学生（单事务，任一失败整批回滚）
    ///
    /// # 返回
    /// - Ok(usize): 实际插入的记录数
    /// - Err: 数据库错误（唯一约束冲突等），事务已回滚
    pub fn batch_insert(&self, students: &[Student]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let count = Self::batch_insert_tx(&tx, students)?;

        tx.commit()?;
        Ok(count)
    }

    fn batch_insert_tx(tx: &Transaction, students: &[Student]) -> RepositoryResult<usize> {
        let mut count = 0;
        for student in students {
            count += Self::insert_with(tx, student)?;
        }
        Ok(count)
    }

    fn insert_with(conn: &Connection, student: &Student) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO student (
                student_id, nis, nisn, full_name, gender, date_of_birth,
                place_of_birth, address, phone, photo_url, guardian_id,
                enrollment_date, status, created_at, updated_at, deleted_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16
            )
            "#,
            params![
                student.student_id,
                student.nis,
                student.nisn,
                student.full_name,
                student.gender.as_str(),
                student.date_of_birth,
                student.place_of_birth,
                student.address,
                student.phone,
                student.photo_url,
                student.guardian_id,
                student.enrollment_date,
                student.status.as_str(),
                student.created_at,
                student.updated_at,
                student.deleted_at,
            ],
        )
    }

    /// 按主键查询（包含已软删除记录）
    pub fn find_by_id(&self, student_id: &str) -> RepositoryResult<Option<Student>> {
        self.find_one("student_id", student_id)
    }

    /// 按 NIS 查询（包含已软删除记录，唯一性覆盖全表）
    pub fn find_by_nis(&self, nis: &str) -> RepositoryResult<Option<Student>> {
        self.find_one("nis", nis)
    }

    /// 按 NISN 查询（包含已软删除记录）
    pub fn find_by_nisn(&self, nisn: &str) -> RepositoryResult<Option<Student>> {
        self.find_one("nisn", nisn)
    }

    fn find_one(&self, column: &str, value: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        // column 只来自本模块的常量
        let sql = format!(
            "SELECT {} FROM student WHERE {} = ?1 LIMIT 1",
            STUDENT_COLUMNS, column
        );
        let student = conn
            .query_row(&sql, params![value], map_student_row)
            .optional()?;
        Ok(student)
    }

    /// 列表查询（按 NIS 排序）
    pub fn list(&self, filter: &StudentFilter) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;

        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if !filter.include_deleted {
            clauses.push("deleted_at IS NULL".to_string());
        }
        if let Some(guardian_id) = &filter.guardian_id {
            values.push(guardian_id.clone());
            clauses.push(format!("guardian_id = ?{}", values.len()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            values.push(format!("%{}%", search));
            let idx = values.len();
            clauses.push(format!(
                "(full_name LIKE ?{idx} OR nis LIKE ?{idx} OR nisn LIKE ?{idx})"
            ));
        }

        let mut sql = format!("SELECT {} FROM student", STUDENT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY nis");
        match (filter.limit, filter.offset) {
            (Some(limit), offset) => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset.unwrap_or(0)))
            }
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        let mut stmt = conn.prepare(&sql)?;
        let students = stmt
            .query_map(params_from_iter(values.iter()), map_student_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    /// 统计某监护人名下未删除的学生数
    pub fn count_active_by_guardian(&self, guardian_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM student WHERE guardian_id = ?1 AND deleted_at IS NULL",
            params![guardian_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 统计学生总数（包含已软删除）
    pub fn count_all(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM student", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 更新学生档案（全字段覆盖）
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示记录不存在）
    pub fn update(&self, student: &Student) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE student SET
                nis = ?2, nisn = ?3, full_name = ?4, gender = ?5, date_of_birth = ?6,
                place_of_birth = ?7, address = ?8, phone = ?9, photo_url = ?10,
                guardian_id = ?11, enrollment_date = ?12, status = ?13, updated_at = ?14
            WHERE student_id = ?1
            "#,
            params![
                student.student_id,
                student.nis,
                student.nisn,
                student.full_name,
                student.gender.as_str(),
                student.date_of_birth,
                student.place_of_birth,
                student.address,
                student.phone,
                student.photo_url,
                student.guardian_id,
                student.enrollment_date,
                student.status.as_str(),
                student.updated_at,
            ],
        )?;
        Ok(affected)
    }

    /// 软删除（只处理未删除记录）
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示不存在或已删除）
    pub fn soft_delete(&self, student_id: &str, at: DateTime<Utc>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE student SET deleted_at = ?2, updated_at = ?2 \
             WHERE student_id = ?1 AND deleted_at IS NULL",
            params![student_id, at],
        )?;
        Ok(affected)
    }
}

fn map_student_row(row: &Row) -> rusqlite::Result<Student> {
    let gender: String = row.get(4)?;
    let status: String = row.get(12)?;

    Ok(Student {
        student_id: row.get(0)?,
        nis: row.get(1)?,
        nisn: row.get(2)?,
        full_name: row.get(3)?,
        gender: Gender::parse(&gender)
            .ok_or_else(|| rusqlite::Error::InvalidColumnType(4, gender.clone(), Type::Text))?,
        date_of_birth: row.get(5)?,
        place_of_birth: row.get(6)?,
        address: row.get(7)?,
        phone: row.get(8)?,
        photo_url: row.get(9)?,
        guardian_id: row.get(10)?,
        enrollment_date: row.get(11)?,
        status: StudentStatus::parse(&status)
            .ok_or_else(|| rusqlite::Error::InvalidColumnType(12, status.clone(), Type::Text))?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
        deleted_at: row.get(15)?,
    })
}
