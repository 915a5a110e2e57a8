// ==========================================
// 学校管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行 / 外部渲染层调用
// ==========================================

pub mod config_api;
pub mod error;
pub mod guardian_api;
pub mod import_api;
pub mod student_api;

// 重导出核心类型
pub use config_api::{ConfigApi, ConfigItem};
pub use error::{ApiError, ApiResult};
pub use guardian_api::{GuardianApi, GuardianInput};
pub use import_api::{ImportApi, TemplateFile};
pub use student_api::{StudentApi, StudentInput};
