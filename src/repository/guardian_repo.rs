// ==========================================
// 学校管理系统 - 监护人仓储
// ==========================================
// 职责: guardian 表 CRUD（软删除通过 deleted_at）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::student::Guardian;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const GUARDIAN_COLUMNS: &str =
    "guardian_id, full_name, phone, email, address, created_at, updated_at, deleted_at";

pub struct GuardianRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GuardianRepository {
    /// 创建新的 GuardianRepository 实例
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

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, guardian: &Guardian) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO guardian (
                guardian_id, full_name, phone, email, address,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                guardian.guardian_id,
                guardian.full_name,
                guardian.phone,
                guardian.email,
                guardian.address,
                guardian.created_at,
                guardian.updated_at,
                guardian.deleted_at,
            ],
        )?;
        Ok(())
    }

    /// 按主键查询（包含已软删除记录）
    pub fn find_by_id(&self, guardian_id: &str) -> RepositoryResult<Option<Guardian>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM guardian WHERE guardian_id = ?1",
            GUARDIAN_COLUMNS
        );
        let guardian = conn
            .query_row(&sql, params![guardian_id], map_guardian_row)
            .optional()?;
        Ok(guardian)
    }

    /// 按主键查询未删除的监护人
    pub fn find_active_by_id(&self, guardian_id: &str) -> RepositoryResult<Option<Guardian>> {
        Ok(self
            .find_by_id(guardian_id)?
            .filter(|guardian| !guardian.is_deleted()))
    }

    /// 列表查询（按姓名排序）
    pub fn list(&self, include_deleted: bool) -> RepositoryResult<Vec<Guardian>> {
        let conn = self.get_conn()?;
        let sql = if include_deleted {
            format!("SELECT {} FROM guardian ORDER BY full_name", GUARDIAN_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM guardian WHERE deleted_at IS NULL ORDER BY full_name",
                GUARDIAN_COLUMNS
            )
        };
        let mut stmt = conn.prepare(&sql)?;
        let guardians = stmt
            .query_map([], map_guardian_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(guardians)
    }

    /// 软删除（只处理未删除记录）
    pub fn soft_delete(&self, guardian_id: &str, at: DateTime<Utc>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE guardian SET deleted_at = ?2, updated_at = ?2 \
             WHERE guardian_id = ?1 AND deleted_at IS NULL",
            params![guardian_id, at],
        )?;
        Ok(affected)
    }
}

fn map_guardian_row(row: &Row) -> rusqlite::Result<Guardian> {
    Ok(Guardian {
        guardian_id: row.get(0)?,
        full_name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        address: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        deleted_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, run_migrations};

    fn setup() -> GuardianRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        run_migrations(&conn).unwrap();
        GuardianRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_insert_find_and_soft_delete() {
        let repo = setup();
        let guardian = Guardian::new(
            "Siti Aminah".to_string(),
            Some("081234567890".to_string()),
            None,
            None,
            Utc::now(),
        );
        repo.insert(&guardian).unwrap();

        let found = repo.find_active_by_id(&guardian.guardian_id).unwrap();
        assert_eq!(found.map(|g| g.full_name), Some("Siti Aminah".to_string()));

        assert_eq!(repo.soft_delete(&guardian.guardian_id, Utc::now()).unwrap(), 1);
        assert!(repo.find_active_by_id(&guardian.guardian_id).unwrap().is_none());
        assert!(repo.find_by_id(&guardian.guardian_id).unwrap().is_some());
        assert!(repo.list(false).unwrap().is_empty());
        assert_eq!(repo.list(true).unwrap().len(), 1);
    }
}
