// ==========================================
// 学校管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite) + calamine/csv
// 核心: 学生档案 Excel 批量导入（逐行校验 + 整批落库）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/迁移）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 页面缓存失效通知
pub mod revalidation;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装共享状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Gender, StudentStatus};

// 领域实体
pub use domain::{
    CellValue, Guardian, ImportErrorEntry, ImportErrorKind, ImportResult, ImportRow, Student,
    ValidatedStudentRecord,
};

// 导入器
pub use importer::{StudentImporter, StudentImporterImpl};

// API
pub use api::{ConfigApi, GuardianApi, ImportApi, StudentApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "School Admin";
