// ==========================================
// 学校管理系统 - 学生/监护人领域模型
// ==========================================
// 对齐: migrations/v0.1_init.sql student / guardian 表
// 软删除: deleted_at 非空即视为已删除
// ==========================================

use crate::domain::import::ValidatedStudentRecord;
use crate::domain::types::{Gender, StudentStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Student - 学生档案
// ==========================================
// 唯一键: nis（必填）、nisn（可选）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    // ===== 主键 =====
    pub student_id: String,

    // ===== 学号 =====
    pub nis: String,          // 校内学号（注册号）
    pub nisn: Option<String>, // 国家学号（第二学号）

    // ===== 基础信息 =====
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub address: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,

    // ===== 关联 =====
    pub guardian_id: String, // FK → guardian

    // ===== 学籍 =====
    pub enrollment_date: NaiveDate,
    pub status: StudentStatus,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Student {
    /// 由校验通过的导入记录生成新学生档案
    pub fn from_validated(record: ValidatedStudentRecord, now: DateTime<Utc>) -> Self {
        Self {
            student_id: Uuid::new_v4().to_string(),
            nis: record.nis,
            nisn: record.nisn,
            full_name: record.full_name,
            gender: record.gender,
            date_of_birth: record.date_of_birth,
            place_of_birth: record.place_of_birth,
            address: record.address,
            phone: record.phone,
            photo_url: record.photo_url,
            guardian_id: record.guardian_id,
            enrollment_date: record.enrollment_date,
            status: StudentStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// 用新的校验结果覆盖可编辑字段（保留主键与创建时间）
    pub fn apply(&mut self, record: ValidatedStudentRecord, now: DateTime<Utc>) {
        self.nis = record.nis;
        self.nisn = record.nisn;
        self.full_name = record.full_name;
        self.gender = record.gender;
        self.date_of_birth = record.date_of_birth;
        self.place_of_birth = record.place_of_birth;
        self.address = record.address;
        self.phone = record.phone;
        self.photo_url = record.photo_url;
        self.guardian_id = record.guardian_id;
        self.enrollment_date = record.enrollment_date;
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// ==========================================
// Guardian - 监护人（家长）
// ==========================================
// 导入只做存在性检查，从不创建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    pub guardian_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Guardian {
    pub fn new(
        full_name: String,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            guardian_id: Uuid::new_v4().to_string(),
            full_name,
            phone,
            email,
            address,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
