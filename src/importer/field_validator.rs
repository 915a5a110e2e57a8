// ==========================================
// 学校管理系统 - 字段校验器实现
// ==========================================
// 职责: 必填 / 最小长度 / Photo URL 格式
// 规则: 按列顺序检查，第一个失败即返回
// ==========================================

use crate::config::FieldRules;
use crate::domain::import::ValidatedStudentRecord;
use crate::importer::columns;
use crate::importer::error::{FieldViolation, ImportError, ImporterResult};
use crate::importer::field_mapper::StudentDraft;
use crate::importer::student_importer_trait::FieldValidator as FieldValidatorTrait;
use chrono::NaiveDate;
use url::Url;

#[derive(Debug, Default, Clone, Copy)]
pub struct FieldValidator;

impl FieldValidator {
    /// 必填文本 + 最小长度（按字符计数）
    fn require_text(
        &self,
        column: &str,
        value: Option<String>,
        min_length: usize,
    ) -> ImporterResult<String> {
        let Some(value) = value else {
            return Err(violation(column, String::new(), FieldViolation::Required));
        };
        if value.chars().count() < min_length {
            return Err(violation(column, value, FieldViolation::MinLength(min_length)));
        }
        Ok(value)
    }

    fn require_date(&self, column: &str, value: Option<NaiveDate>) -> ImporterResult<NaiveDate> {
        value.ok_or_else(|| violation(column, String::new(), FieldViolation::Required))
    }

    /// 可选 URL：必须是带主机名的 http(s) 绝对地址
    fn optional_url(&self, column: &str, value: Option<String>) -> ImporterResult<Option<String>> {
        let Some(value) = value else {
            return Ok(None);
        };
        match Url::parse(&value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {
                Ok(Some(value))
            }
            _ => Err(violation(column, value, FieldViolation::InvalidUrl)),
        }
    }
}

fn violation(column: &str, value: String, violation: FieldViolation) -> ImportError {
    ImportError::FieldValidation {
        field: column.to_string(),
        value,
        violation,
    }
}

impl FieldValidatorTrait for FieldValidator {
    fn validate(
        &self,
        draft: StudentDraft,
        rules: &FieldRules,
    ) -> ImporterResult<ValidatedStudentRecord> {
        let nis = self.require_text(columns::NIS, draft.nis, rules.min_nis_length)?;
        let full_name = self.require_text(columns::FULL_NAME, draft.full_name, rules.min_name_length)?;
        let date_of_birth = self.require_date(columns::DATE_OF_BIRTH, draft.date_of_birth)?;
        let place_of_birth = self.require_text(
            columns::PLACE_OF_BIRTH,
            draft.place_of_birth,
            rules.min_place_of_birth_length,
        )?;
        let address = self.require_text(columns::ADDRESS, draft.address, rules.min_address_length)?;
        let guardian_id = self.require_text(columns::GUARDIAN_ID, draft.guardian_id, 1)?;
        let enrollment_date = self.require_date(columns::ENROLLMENT_DATE, draft.enrollment_date)?;
        let photo_url = self.optional_url(columns::PHOTO_URL, draft.photo_url)?;

        Ok(ValidatedStudentRecord {
            nis,
            nisn: draft.nisn,
            full_name,
            gender: draft.gender,
            date_of_birth,
            place_of_birth,
            address,
            phone: draft.phone,
            photo_url,
            guardian_id,
            enrollment_date,
        })
    }
}
