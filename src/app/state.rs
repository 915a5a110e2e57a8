// ==========================================
// 学校管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, GuardianApi, ImportApi, StudentApi};
use crate::config::{config_keys, ConfigManager};
use crate::db::{open_sqlite_connection, run_migrations};
use crate::importer::{StudentImporter, StudentImporterImpl};
use crate::repository::{GuardianRepository, StudentImportRepositoryImpl, StudentRepository};
use crate::revalidation::{NoOpRevalidator, PageRevalidator};

/// 应用状态
///
/// 包含所有API实例和共享资源（单一共享 SQLite 连接）
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 学生导入API
    pub import_api: Arc<ImportApi>,

    /// 学生档案API
    pub student_api: Arc<StudentApi>,

    /// 监护人API
    pub guardian_api: Arc<GuardianApi>,

    /// 配置API
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例（不做页面失效通知）
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_revalidator(db_path, Arc::new(NoOpRevalidator))
    }

    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并执行迁移
    /// 2. 应用配置中的界面语言
    /// 3. 初始化Repository与API实例
    pub fn with_revalidator(
        db_path: String,
        revalidator: Arc<dyn PageRevalidator>,
    ) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        run_migrations(&conn).map_err(|e| format!("数据库迁移失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        match config_manager.get_global_config_value(config_keys::LOCALE) {
            Ok(Some(locale)) => crate::i18n::set_locale(&locale.trim().to_lowercase()),
            Ok(None) => {}
            Err(e) => tracing::warn!("读取语言配置失败(使用默认语言): {}", e),
        }

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let student_repo = Arc::new(StudentRepository::from_connection(conn.clone()));
        let guardian_repo = Arc::new(GuardianRepository::from_connection(conn.clone()));

        // ==========================================
        // 初始化导入器
        // ==========================================
        let importer_config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        let importer: Arc<dyn StudentImporter> = Arc::new(StudentImporterImpl::with_defaults(
            StudentImportRepositoryImpl::new(student_repo.clone(), guardian_repo.clone()),
            importer_config,
            revalidator.clone(),
        ));

        // ==========================================
        // 初始化API层
        // ==========================================
        let import_api = Arc::new(ImportApi::new(importer, config_manager.clone()));
        let student_api = Arc::new(StudentApi::new(
            student_repo.clone(),
            guardian_repo.clone(),
            config_manager.clone(),
            revalidator,
        ));
        let guardian_api = Arc::new(GuardianApi::new(guardian_repo, student_repo));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            import_api,
            student_api,
            guardian_api,
            config_api,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SCHOOL_ADMIN_DB_PATH（非空时）
/// - 否则: 用户数据目录/school-admin/school_admin.db
/// - 无法获取用户数据目录时: ./school_admin.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("SCHOOL_ADMIN_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./school_admin.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("school-admin");
        // 确保目录存在
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("school_admin.db");
        }
    }

    path.to_string_lossy().to_string()
}
