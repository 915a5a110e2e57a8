// ==========================================
// 学生导入API
// ==========================================
// 职责: 上传边界检查（扩展名 / 大小）+ 调用导入器 + 模板下载
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::import::ImportResult;
use crate::importer::{FileFormat, ImportTemplate, StudentImporter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// 模板文件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFile {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// 导入API
pub struct ImportApi {
    importer: Arc<dyn StudentImporter>,
    config: Arc<ConfigManager>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(importer: Arc<dyn StudentImporter>, config: Arc<ConfigManager>) -> Self {
        Self { importer, config }
    }

    /// 导入学生数据
    ///
    /// # 参数
    /// - file_name: 上传文件名（用于判断格式）
    /// - bytes: 文件内容
    ///
    /// # 返回
    /// - Ok(ImportResult): 导入结果（含逐行错误）
    /// - Err(ApiError::InvalidInput): 格式不支持或超出大小限制
    pub async fn import_students(&self, file_name: &str, bytes: &[u8]) -> ApiResult<ImportResult> {
        let format = FileFormat::from_file_name(file_name).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "文件格式不支持: {}（仅支持 .xlsx/.xls/.csv）",
                file_name
            ))
        })?;

        let max_bytes = self
            .config
            .get_max_file_bytes()
            .await
            .map_err(|e| ApiError::InternalError(format!("读取上传配置失败: {}", e)))?;
        if bytes.len() > max_bytes {
            warn!(file_name = %file_name, size = bytes.len(), max_bytes, "上传文件超出大小限制");
            return Err(ApiError::InvalidInput(format!(
                "文件过大: {} 字节（上限 {} 字节）",
                bytes.len(),
                max_bytes
            )));
        }

        info!(file_name = %file_name, size = bytes.len(), "收到学生导入文件");
        let result = self.importer.import_batch(bytes, format).await?;
        Ok(result)
    }

    /// 下载导入模板（CSV）
    pub fn download_template(&self) -> ApiResult<TemplateFile> {
        let content = ImportTemplate::render_csv()?;
        Ok(TemplateFile {
            file_name: ImportTemplate::FILE_NAME.to_string(),
            content_type: "text/csv".to_string(),
            content,
        })
    }
}
