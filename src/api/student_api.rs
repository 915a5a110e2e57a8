// ==========================================
// 学校管理系统 - 学生档案 API
// ==========================================
// 职责: 单条学生档案的新增 / 修改 / 软删除 / 查询
// 说明: 新增与修改复用导入管道的字段映射器与校验器，规则完全一致
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::import::{CellValue, ImportRow, ValidatedStudentRecord};
use crate::domain::student::Student;
use crate::importer::{
    columns, FieldMapper, FieldMapperImpl, FieldValidator, FieldValidatorImpl, ImportError,
};
use crate::repository::{GuardianRepository, StudentFilter, StudentRepository};
use crate::revalidation::{self, PageRevalidator};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// StudentInput - 表单输入
// ==========================================
// 日期接受 YYYY-MM-DD 或 DD/MM/YYYY，性别大小写不敏感
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    pub nis: String,
    #[serde(default)]
    pub nisn: Option<String>,
    pub full_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub place_of_birth: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub guardian_id: String,
    pub enrollment_date: String,
}

impl StudentInput {
    /// 转为与导入文件相同形状的行（行号 0）
    fn to_row(&self) -> ImportRow {
        let optional = |value: &Option<String>| {
            value
                .as_deref()
                .map(CellValue::text)
                .unwrap_or(CellValue::Empty)
        };

        ImportRow::new(0)
            .with_cell(columns::NIS, CellValue::text(&self.nis))
            .with_cell(columns::NISN, optional(&self.nisn))
            .with_cell(columns::FULL_NAME, CellValue::text(&self.full_name))
            .with_cell(columns::GENDER, CellValue::text(&self.gender))
            .with_cell(columns::DATE_OF_BIRTH, CellValue::text(&self.date_of_birth))
            .with_cell(columns::PLACE_OF_BIRTH, CellValue::text(&self.place_of_birth))
            .with_cell(columns::ADDRESS, CellValue::text(&self.address))
            .with_cell(columns::PHONE, optional(&self.phone))
            .with_cell(columns::PHOTO_URL, optional(&self.photo_url))
            .with_cell(columns::GUARDIAN_ID, CellValue::text(&self.guardian_id))
            .with_cell(columns::ENROLLMENT_DATE, CellValue::text(&self.enrollment_date))
    }
}

/// 学生档案API
pub struct StudentApi {
    student_repo: Arc<StudentRepository>,
    guardian_repo: Arc<GuardianRepository>,
    config: Arc<ConfigManager>,
    revalidator: Arc<dyn PageRevalidator>,
    field_mapper: FieldMapperImpl,
    field_validator: FieldValidatorImpl,
}

impl StudentApi {
    pub fn new(
        student_repo: Arc<StudentRepository>,
        guardian_repo: Arc<GuardianRepository>,
        config: Arc<ConfigManager>,
        revalidator: Arc<dyn PageRevalidator>,
    ) -> Self {
        Self {
            student_repo,
            guardian_repo,
            config,
            revalidator,
            field_mapper: FieldMapperImpl::default(),
            field_validator: FieldValidatorImpl,
        }
    }

    /// 新增学生
    ///
    /// # 返回
    /// - Err(ValidationError): 字段校验失败 / NIS、NISN 重复 / 监护人不存在
    pub async fn create_student(&self, input: StudentInput) -> ApiResult<Student> {
        let record = self.validate_input(&input).await?;
        self.ensure_unique(&record, None)?;
        self.ensure_guardian(&record.guardian_id)?;

        let student = Student::from_validated(record, Utc::now());
        self.student_repo.insert(&student)?;

        info!(student_id = %student.student_id, nis = %student.nis, "学生档案已创建");
        self.revalidate_student_list().await;
        Ok(student)
    }

    /// 修改学生（忽略自身的 NIS / NISN）
    pub async fn update_student(&self, student_id: &str, input: StudentInput) -> ApiResult<Student> {
        let mut student = self.get_student(student_id)?;

        let record = self.validate_input(&input).await?;
        self.ensure_unique(&record, Some(student_id))?;
        self.ensure_guardian(&record.guardian_id)?;

        student.apply(record, Utc::now());
        if self.student_repo.update(&student)? == 0 {
            return Err(not_found(student_id));
        }

        info!(student_id = %student_id, "学生档案已更新");
        self.revalidate_student_list().await;
        Ok(student)
    }

    /// 软删除学生
    pub async fn delete_student(&self, student_id: &str) -> ApiResult<()> {
        if self.student_repo.soft_delete(student_id, Utc::now())? == 0 {
            return Err(not_found(student_id));
        }

        info!(student_id = %student_id, "学生档案已删除");
        self.revalidate_student_list().await;
        Ok(())
    }

    /// 查询学生（已删除视为不存在）
    pub fn get_student(&self, student_id: &str) -> ApiResult<Student> {
        self.student_repo
            .find_by_id(student_id)?
            .filter(|s| !s.is_deleted())
            .ok_or_else(|| not_found(student_id))
    }

    /// 列表查询
    pub fn list_students(&self, filter: &StudentFilter) -> ApiResult<Vec<Student>> {
        Ok(self.student_repo.list(filter)?)
    }

    // ===== 内部校验 =====

    async fn validate_input(&self, input: &StudentInput) -> ApiResult<ValidatedStudentRecord> {
        let rules = self
            .config
            .get_field_rules()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取校验配置失败: {}", e)))?;

        let draft = self.field_mapper.map_row(&input.to_row())?;
        Ok(self.field_validator.validate(draft, &rules)?)
    }

    fn ensure_unique(
        &self,
        record: &ValidatedStudentRecord,
        exclude_id: Option<&str>,
    ) -> ApiResult<()> {
        let is_other = |s: &Student| Some(s.student_id.as_str()) != exclude_id;

        if self
            .student_repo
            .find_by_nis(&record.nis)?
            .is_some_and(|s| is_other(&s))
        {
            return Err(ImportError::DuplicateRegistrationId {
                nis: record.nis.clone(),
                in_batch: false,
            }
            .into());
        }

        if let Some(nisn) = &record.nisn {
            if self
                .student_repo
                .find_by_nisn(nisn)?
                .is_some_and(|s| is_other(&s))
            {
                return Err(ImportError::DuplicateSecondaryId {
                    nisn: nisn.clone(),
                    in_batch: false,
                }
                .into());
            }
        }
        Ok(())
    }

    fn ensure_guardian(&self, guardian_id: &str) -> ApiResult<()> {
        if self.guardian_repo.find_active_by_id(guardian_id)?.is_none() {
            return Err(ImportError::GuardianNotFound {
                guardian_id: guardian_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn revalidate_student_list(&self) {
        match self.config.get_student_list_path().await {
            Ok(path) => revalidation::notify(self.revalidator.as_ref(), &path),
            Err(e) => warn!(error = %e, "读取列表页路径失败，跳过页面失效通知"),
        }
    }
}

fn not_found(student_id: &str) -> ApiError {
    ApiError::NotFound(format!("Student(id={})不存在", student_id))
}
