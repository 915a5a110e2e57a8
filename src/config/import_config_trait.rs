// ==========================================
// 学校管理系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// FieldRules - 字段最小长度规则
// ==========================================
// 导入与单条录入共用同一套规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRules {
    pub min_nis_length: usize,
    pub min_name_length: usize,
    pub min_place_of_birth_length: usize,
    pub min_address_length: usize,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            min_nis_length: 1,
            min_name_length: 3,
            min_place_of_birth_length: 2,
            min_address_length: 5,
        }
    }
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 字段校验配置 =====

    /// 获取 NIS 最小长度
    ///
    /// # 默认值
    /// - 1
    async fn get_min_nis_length(&self) -> ConfigResult<usize>;

    /// 获取姓名最小长度
    ///
    /// # 默认值
    /// - 3
    async fn get_min_name_length(&self) -> ConfigResult<usize>;

    /// 获取出生地最小长度
    ///
    /// # 默认值
    /// - 2
    async fn get_min_place_of_birth_length(&self) -> ConfigResult<usize>;

    /// 获取地址最小长度
    ///
    /// # 默认值
    /// - 5
    async fn get_min_address_length(&self) -> ConfigResult<usize>;

    // ===== 上传配置 =====

    /// 获取上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 5242880 (5 MiB)
    async fn get_max_file_bytes(&self) -> ConfigResult<usize>;

    // ===== 展示配置 =====

    /// 获取学生列表页路径（导入成功后刷新）
    ///
    /// # 默认值
    /// - /dashboard/students
    async fn get_student_list_path(&self) -> ConfigResult<String>;

    /// 获取消息语言
    ///
    /// # 默认值
    /// - en
    async fn get_locale(&self) -> ConfigResult<String>;

    /// 一次读取全部字段规则
    async fn get_field_rules(&self) -> ConfigResult<FieldRules> {
        Ok(FieldRules {
            min_nis_length: self.get_min_nis_length().await?,
            min_name_length: self.get_min_name_length().await?,
            min_place_of_birth_length: self.get_min_place_of_birth_length().await?,
            min_address_length: self.get_min_address_length().await?,
        })
    }
}
