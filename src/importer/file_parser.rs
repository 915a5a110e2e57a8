// ==========================================
// 学校管理系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输入: 上传文件的字节内容（不落盘）
// 行号: 表头为第 1 行，数据从第 2 行开始；完全空白的行被丢弃但不重排行号
// 编码: CSV 按字段解码，非 UTF-8 字节替换为 U+FFFD，不影响其他行
// ==========================================

use crate::domain::import::{CellValue, ImportRow, ParsedSheet};
use crate::importer::data_cleaner::{excel_serial_to_date, parse_text_date};
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::student_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use csv::{ByteRecord, ReaderBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

// ==========================================
// FileFormat - 上传文件格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Xlsx,
    Xls,
    Csv,
}

impl FileFormat {
    /// 根据文件名扩展名判断格式（大小写不敏感）
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(FileFormat::Xlsx),
            "xls" => Some(FileFormat::Xls),
            "csv" => Some(FileFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Xlsx => "xlsx",
            FileFormat::Xls => "xls",
            FileFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    pub fn parse(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        // 读取表头（去除 UTF-8 BOM）
        let headers: Vec<String> = decode_fields(reader.byte_headers()?)
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.byte_records().enumerate() {
            let record = result?;
            // 记录起始行号；缺失时按顺序推算
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);

            let mut row = ImportRow::new(row_number);
            for (col_idx, value) in decode_fields(&record).enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.cells.insert(header.clone(), CellValue::text(&value));
                }
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(ParsedSheet { headers, rows })
    }
}

/// 逐字段解码；Windows 导出的 cp1252 字节只影响所在单元格
fn decode_fields(record: &ByteRecord) -> impl Iterator<Item = String> + '_ {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    pub fn parse(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let Some(sheet_name) = sheet_names.first().cloned() else {
            return Err(ImportError::ExcelParseError("workbook has no worksheets".to_string()));
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // 区域起始行（0 起始）；空表无起点
        let Some((start_row, _)) = range.start() else {
            return Ok(ParsedSheet::default());
        };

        let mut rows_iter = range.rows();
        let headers: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return Ok(ParsedSheet::default()),
        };

        let mut rows = Vec::new();
        for (idx, data_row) in rows_iter.enumerate() {
            // 表头在 start_row + 1，数据行依次递增
            let row_number = start_row as usize + idx + 2;

            let mut row = ImportRow::new(row_number);
            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if header.is_empty() {
                        continue;
                    }
                    row.cells.insert(header.clone(), to_cell_value(cell));
                }
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(ParsedSheet { headers, rows })
    }
}

/// calamine 单元格 → CellValue
fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_datetime_to_cell(dt),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(parse_text_date)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::text(s)),
        Data::DurationIso(s) => CellValue::text(s),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// 日期格式单元格；as_datetime 已按工作簿的 1904 标志换算
fn excel_datetime_to_cell(dt: &ExcelDateTime) -> CellValue {
    if dt.is_duration() {
        return CellValue::Number(dt.as_f64());
    }
    dt.as_datetime()
        .map(|d| d.date())
        .or_else(|| excel_serial_to_date(dt.as_f64()))
        .map(CellValue::Date)
        .unwrap_or(CellValue::Number(dt.as_f64()))
}

// ==========================================
// 通用文件解析器（根据格式自动选择）
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_sheet(&self, bytes: &[u8], format: FileFormat) -> ImporterResult<ParsedSheet> {
        match format {
            FileFormat::Csv => CsvParser.parse(bytes),
            FileFormat::Xlsx | FileFormat::Xls => ExcelParser.parse(bytes),
        }
    }
}
