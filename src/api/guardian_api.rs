// ==========================================
// 学校管理系统 - 监护人 API
// ==========================================
// 职责: 监护人新增 / 查询 / 软删除
// 规则: 仍被未删除学生引用的监护人不可删除
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::student::Guardian;
use crate::repository::{GuardianRepository, StudentRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// 监护人表单输入
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianInput {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// 监护人API
pub struct GuardianApi {
    guardian_repo: Arc<GuardianRepository>,
    student_repo: Arc<StudentRepository>,
}

impl GuardianApi {
    pub fn new(guardian_repo: Arc<GuardianRepository>, student_repo: Arc<StudentRepository>) -> Self {
        Self {
            guardian_repo,
            student_repo,
        }
    }

    /// 新增监护人
    pub fn create_guardian(&self, input: GuardianInput) -> ApiResult<Guardian> {
        let full_name = input.full_name.trim();
        if full_name.is_empty() {
            return Err(ApiError::ValidationError {
                field: "fullName".to_string(),
                message: "监护人姓名不能为空".to_string(),
            });
        }

        let guardian = Guardian::new(
            full_name.to_string(),
            non_blank(input.phone),
            non_blank(input.email),
            non_blank(input.address),
            Utc::now(),
        );
        self.guardian_repo.insert(&guardian)?;

        info!(guardian_id = %guardian.guardian_id, "监护人已创建");
        Ok(guardian)
    }

    /// 查询监护人（已删除视为不存在）
    pub fn get_guardian(&self, guardian_id: &str) -> ApiResult<Guardian> {
        self.guardian_repo
            .find_active_by_id(guardian_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Guardian(id={})不存在", guardian_id)))
    }

    /// 列表查询
    pub fn list_guardians(&self, include_deleted: bool) -> ApiResult<Vec<Guardian>> {
        Ok(self.guardian_repo.list(include_deleted)?)
    }

    /// 软删除监护人
    pub fn delete_guardian(&self, guardian_id: &str) -> ApiResult<()> {
        self.get_guardian(guardian_id)?;

        let active_students = self.student_repo.count_active_by_guardian(guardian_id)?;
        if active_students > 0 {
            return Err(ApiError::BusinessRuleViolation(format!(
                "监护人仍关联 {} 名学生，无法删除",
                active_students
            )));
        }

        self.guardian_repo.soft_delete(guardian_id, Utc::now())?;
        info!(guardian_id = %guardian_id, "监护人已删除");
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
