// ==========================================
// 学校管理系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 宽松日期解析 / 性别标准化
// ==========================================

use crate::domain::import::CellValue;
use crate::domain::types::Gender;
use crate::importer::student_importer_trait::DataCleaner as DataCleanerTrait;
use chrono::{Days, NaiveDate};

/// 表格序列号上限（9999-12-31）
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// 文本日期格式（按顺序尝试）
const TEXT_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// 表格序列号 → 日期
///
/// 纪元取 1899-12-30：序列号 1 = 1900-01-01 之前一天的历史偏移，
/// 同时抵消了表格格式把 1900 年当作闰年的错误（对 1900-03-01 之后的日期成立）。
/// 小数部分（时间）被丢弃。
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}

/// 文本日期解析（ISO 或 DD/MM/YYYY）
pub fn parse_text_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &CellValue) -> Option<String> {
        let text = value.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn parse_date(&self, value: &CellValue) -> Option<NaiveDate> {
        match value {
            CellValue::Date(date) => Some(*date),
            CellValue::Number(serial) => excel_serial_to_date(*serial),
            CellValue::Text(text) => parse_text_date(text).or_else(|| {
                // CSV 中的纯数字按序列号处理
                text.trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(excel_serial_to_date)
            }),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    fn normalize_gender(&self, value: &CellValue) -> Option<Gender> {
        match value {
            CellValue::Text(text) => Gender::parse(text),
            _ => None,
        }
    }
}
