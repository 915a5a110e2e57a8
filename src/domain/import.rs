// ==========================================
// 学校管理系统 - 导入领域模型
// ==========================================
// 数据流: 原始字节 → ImportRow → ValidatedStudentRecord | ImportErrorEntry
//         → ImportResult（汇总 + 逐行错误）
// 说明: ImportRow / ValidatedStudentRecord 只在单次导入内存在，不落库
// ==========================================

use crate::domain::types::Gender;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
// 表格单元格类型未知，解析时收窄为以下几类
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// 由文本构造（TRIM 后为空则为 Empty）
    pub fn text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            // 整数值的浮点单元格（如学号 2024001.0）按整数输出
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

// ==========================================
// ImportRow - 原始行记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// 表格中的真实行号（1 起始，表头为第 1 行）
    pub row_number: usize,
    /// 列名 → 单元格值
    pub cells: HashMap<String, CellValue>,
}

impl ImportRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            cells: HashMap::new(),
        }
    }

    /// 链式添加单元格（测试与解析器共用）
    pub fn with_cell(mut self, column: &str, value: CellValue) -> Self {
        self.cells.insert(column.to_string(), value);
        self
    }

    /// 读取单元格；缺列视为空
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// 读取单元格文本（TRIM 后为空返回 None）
    pub fn text(&self, column: &str) -> Option<String> {
        let value = self.get(column).to_string();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// 所有单元格均为空
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_empty)
    }
}

// ==========================================
// ParsedSheet - 解析后的工作表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<ImportRow>,
}

// ==========================================
// ValidatedStudentRecord - 校验通过的学生记录
// ==========================================
// 不变式: 只有通过全部校验阶段的行才会生成此结构，之后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedStudentRecord {
    pub nis: String,
    pub nisn: Option<String>,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub address: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub guardian_id: String,
    pub enrollment_date: NaiveDate,
}

// ==========================================
// ImportErrorKind - 错误分类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportErrorKind {
    // ===== 文件级（致命）=====
    EmptyFile,
    MissingColumns,
    UnreadableFile,

    // ===== 行级（跳过该行）=====
    DateFormat,
    GenderValue,
    FieldValidation,
    DuplicateRegistrationId,
    DuplicateSecondaryId,
    GuardianNotFound,

    // ===== 落库（整批回滚）=====
    Commit,
}

impl ImportErrorKind {
    /// 是否为行级错误
    pub fn is_row_scoped(&self) -> bool {
        !matches!(
            self,
            ImportErrorKind::EmptyFile
                | ImportErrorKind::MissingColumns
                | ImportErrorKind::UnreadableFile
                | ImportErrorKind::Commit
        )
    }
}

// ==========================================
// ImportErrorEntry - 错误明细（供前端错误表展示）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportErrorEntry {
    /// 表格行号；文件级错误为 0
    pub row: usize,
    /// 出错列名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    /// 原始单元格值
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub kind: ImportErrorKind,
}

impl ImportErrorEntry {
    /// 文件级错误（row = 0）
    pub fn file_level(kind: ImportErrorKind, message: String) -> Self {
        Self {
            row: 0,
            field: None,
            message,
            data: None,
            kind,
        }
    }
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
// 不变式: imported + skipped == total_rows（全空行不计入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub batch_id: String,
    pub success: bool,
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportErrorEntry>,
    pub summary: String,
}

impl ImportResult {
    /// 致命错误结果（未处理任何行）
    pub fn fatal(batch_id: String, entry: ImportErrorEntry) -> Self {
        Self {
            batch_id,
            success: false,
            total_rows: 0,
            imported: 0,
            skipped: 0,
            summary: entry.message.clone(),
            errors: vec![entry],
        }
    }

    /// 行级错误明细
    pub fn row_errors(&self) -> impl Iterator<Item = &ImportErrorEntry> {
        self.errors.iter().filter(|e| e.kind.is_row_scoped())
    }

    /// 指定类型的错误数
    pub fn count_errors(&self, kind: ImportErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }
}
