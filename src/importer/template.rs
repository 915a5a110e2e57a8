// ==========================================
// 学校管理系统 - 导入模板生成
// ==========================================
// 职责: 生成表头 + 一行示例数据的 CSV 模板
// 说明: 列来自 columns::COLUMNS，与导入校验同源
// ==========================================

use crate::importer::columns::COLUMNS;
use crate::importer::error::{ImportError, ImporterResult};
use csv::WriterBuilder;

pub struct ImportTemplate;

impl ImportTemplate {
    /// 模板文件名
    pub const FILE_NAME: &'static str = "student_import_template.csv";

    /// 生成 CSV 模板字节
    pub fn render_csv() -> ImporterResult<Vec<u8>> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());

        writer.write_record(COLUMNS.iter().map(|c| c.header))?;
        writer.write_record(COLUMNS.iter().map(|c| c.example))?;

        writer
            .into_inner()
            .map_err(|e| ImportError::InternalError(format!("模板写入失败: {}", e)))
    }
}
