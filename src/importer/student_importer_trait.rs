// ==========================================
// 学校管理系统 - 学生导入 Trait
// ==========================================
// 职责: 定义学生导入接口与管道组件接口（不包含实现）
// ==========================================

use crate::config::FieldRules;
use crate::domain::import::{CellValue, ImportResult, ImportRow, ParsedSheet, ValidatedStudentRecord};
use crate::domain::types::Gender;
use crate::importer::error::ImporterResult;
use crate::importer::field_mapper::StudentDraft;
use crate::importer::file_parser::FileFormat;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// StudentImporter Trait
// ==========================================
// 用途: 学生批量导入主接口
// 实现者: StudentImporterImpl
#[async_trait]
pub trait StudentImporter: Send + Sync {
    /// 导入一个上传文件中的学生数据
    ///
    /// # 参数
    /// - bytes: 文件内容
    /// - format: 文件格式（由文件扩展名决定）
    ///
    /// # 返回
    /// - Ok(ImportResult): 导入结果（包括文件级致命错误与逐行错误）
    /// - Err: 基础设施错误（数据库查询、配置读取失败）
    ///
    /// # 导入流程
    /// 1. 文件解析（空文件 / 缺列为致命错误）
    /// 2. 逐行: 日期 → 性别 → 字段校验 → NIS/NISN 重复 → 监护人存在性
    /// 3. 通过的行整批事务化落库
    /// 4. 汇总结果，成功后刷新学生列表页
    async fn import_batch(&self, bytes: &[u8], format: FileFormat) -> ImporterResult<ImportResult>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析第一个工作表为表头 + 数据行
    ///
    /// # 说明
    /// - 完全空白的行被丢弃，保留其余行的真实行号
    fn parse_sheet(&self, bytes: &[u8], format: FileFormat) -> ImporterResult<ParsedSheet>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格清洗接口
// 实现者: DataCleanerImpl
pub trait DataCleaner: Send + Sync {
    /// 清洗文本（TRIM，空白 → None）
    fn clean_text(&self, value: &CellValue) -> Option<String>;

    /// 宽松日期解析
    ///
    /// # 支持
    /// - 原生日期单元格
    /// - 表格序列号（纪元 1899-12-30）
    /// - YYYY-MM-DD
    /// - DD/MM/YYYY
    ///
    /// # 返回
    /// - None: 无法识别（空单元格也返回 None，由调用方区分）
    fn parse_date(&self, value: &CellValue) -> Option<NaiveDate>;

    /// 性别标准化（大小写不敏感）
    fn normalize_gender(&self, value: &CellValue) -> Option<Gender>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 原始行 → StudentDraft（日期与性别转换）
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// 映射单行
    ///
    /// # 返回
    /// - Ok(StudentDraft): 日期/性别已类型化的中间结构
    /// - Err(DateFormat | GenderValue): 该行被放弃
    fn map_row(&self, row: &ImportRow) -> ImporterResult<StudentDraft>;
}

// ==========================================
// FieldValidator Trait
// ==========================================
// 用途: 字段级校验（必填 / 最小长度 / URL）
// 实现者: FieldValidatorImpl
pub trait FieldValidator: Send + Sync {
    /// 校验并生成 ValidatedStudentRecord
    ///
    /// # 返回
    /// - Err(FieldValidation): 第一个失败的字段
    fn validate(
        &self,
        draft: StudentDraft,
        rules: &FieldRules,
    ) -> ImporterResult<ValidatedStudentRecord>;
}
