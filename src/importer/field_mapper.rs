// ==========================================
// 学校管理系统 - 字段映射器实现
// ==========================================
// 职责: 表头列 → StudentDraft + 日期/性别类型转换
// 顺序: Date of Birth → Enrollment Date → Gender（任一失败即放弃该行）
// ==========================================

use crate::domain::import::ImportRow;
use crate::domain::types::Gender;
use crate::importer::columns;
use crate::importer::data_cleaner::DataCleaner as DefaultDataCleaner;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::student_importer_trait::{DataCleaner, FieldMapper as FieldMapperTrait};
use chrono::NaiveDate;

// ==========================================
// StudentDraft - 映射后的中间结构
// ==========================================
// 日期与性别已类型化；文本字段仅 TRIM，必填/长度校验由 FieldValidator 完成
#[derive(Debug, Clone, PartialEq)]
pub struct StudentDraft {
    pub row_number: usize,
    pub nis: Option<String>,
    pub nisn: Option<String>,
    pub full_name: Option<String>,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub guardian_id: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
}

pub struct FieldMapper {
    cleaner: Box<dyn DataCleaner>,
}

impl FieldMapper {
    pub fn new(cleaner: Box<dyn DataCleaner>) -> Self {
        Self { cleaner }
    }

    /// 日期列：空单元格 → None（交给必填校验），无法识别 → DateFormat
    fn map_date(&self, row: &ImportRow, column: &str) -> ImporterResult<Option<NaiveDate>> {
        let cell = row.get(column);
        if cell.is_empty() {
            return Ok(None);
        }
        self.cleaner
            .parse_date(cell)
            .map(Some)
            .ok_or_else(|| ImportError::DateFormat {
                field: column.to_string(),
                value: cell.to_string(),
            })
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(Box::new(DefaultDataCleaner))
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_row(&self, row: &ImportRow) -> ImporterResult<StudentDraft> {
        let date_of_birth = self.map_date(row, columns::DATE_OF_BIRTH)?;
        let enrollment_date = self.map_date(row, columns::ENROLLMENT_DATE)?;

        let gender_cell = row.get(columns::GENDER);
        let gender = self
            .cleaner
            .normalize_gender(gender_cell)
            .ok_or_else(|| ImportError::GenderValue {
                value: gender_cell.to_string(),
            })?;

        let text = |column: &str| self.cleaner.clean_text(row.get(column));

        Ok(StudentDraft {
            row_number: row.row_number,
            nis: text(columns::NIS),
            nisn: text(columns::NISN),
            full_name: text(columns::FULL_NAME),
            gender,
            date_of_birth,
            place_of_birth: text(columns::PLACE_OF_BIRTH),
            address: text(columns::ADDRESS),
            phone: text(columns::PHONE),
            photo_url: text(columns::PHOTO_URL),
            guardian_id: text(columns::GUARDIAN_ID),
            enrollment_date,
        })
    }
}
