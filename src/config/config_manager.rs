// ==========================================
// 学校管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{ConfigResult, ImportConfigReader};
use crate::db::open_sqlite_connection;
use crate::i18n::SUPPORTED_LOCALES;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = %key, "配置已更新");
        Ok(())
    }

    /// 列出 global scope 的全部已存储配置（按 key 排序）
    pub fn list_global_configs(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut configs = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            configs.insert(key, value);
        }
        Ok(configs)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取并解析配置值，格式错误时回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    // ===== 字段校验配置 =====

    async fn get_min_nis_length(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::MIN_NIS_LENGTH, defaults::MIN_NIS_LENGTH)
    }

    async fn get_min_name_length(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::MIN_NAME_LENGTH, defaults::MIN_NAME_LENGTH)
    }

    async fn get_min_place_of_birth_length(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(
            config_keys::MIN_PLACE_OF_BIRTH_LENGTH,
            defaults::MIN_PLACE_OF_BIRTH_LENGTH,
        )
    }

    async fn get_min_address_length(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::MIN_ADDRESS_LENGTH, defaults::MIN_ADDRESS_LENGTH)
    }

    // ===== 上传配置 =====

    async fn get_max_file_bytes(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::MAX_FILE_BYTES, defaults::MAX_FILE_BYTES)
    }

    // ===== 展示配置 =====

    async fn get_student_list_path(&self) -> ConfigResult<String> {
        let value =
            self.get_config_or_default(config_keys::STUDENT_LIST_PATH, defaults::STUDENT_LIST_PATH)?;
        if value.starts_with('/') {
            Ok(value)
        } else {
            tracing::warn!(
                config_key = config_keys::STUDENT_LIST_PATH,
                raw_value = %value,
                "列表页路径必须以 / 开头，使用默认值"
            );
            Ok(defaults::STUDENT_LIST_PATH.to_string())
        }
    }

    async fn get_locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::LOCALE, defaults::LOCALE)?;
        let value = value.trim().to_lowercase();
        if SUPPORTED_LOCALES.contains(&value.as_str()) {
            Ok(value)
        } else {
            tracing::warn!(
                config_key = config_keys::LOCALE,
                raw_value = %value,
                "不支持的语言配置，使用默认值"
            );
            Ok(defaults::LOCALE.to_string())
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 字段校验
    pub const MIN_NIS_LENGTH: &str = "import.min_nis_length";
    pub const MIN_NAME_LENGTH: &str = "import.min_name_length";
    pub const MIN_PLACE_OF_BIRTH_LENGTH: &str = "import.min_place_of_birth_length";
    pub const MIN_ADDRESS_LENGTH: &str = "import.min_address_length";

    // 上传
    pub const MAX_FILE_BYTES: &str = "import.max_file_bytes";

    // 展示
    pub const STUDENT_LIST_PATH: &str = "student.list_path";
    pub const LOCALE: &str = "ui.locale";

    /// 全部已知配置键（ConfigApi 只接受这些键）
    pub const ALL: [&str; 7] = [
        MIN_NIS_LENGTH,
        MIN_NAME_LENGTH,
        MIN_PLACE_OF_BIRTH_LENGTH,
        MIN_ADDRESS_LENGTH,
        MAX_FILE_BYTES,
        STUDENT_LIST_PATH,
        LOCALE,
    ];
}

// ==========================================
// 配置默认值
// ==========================================
pub mod defaults {
    pub const MIN_NIS_LENGTH: usize = 1;
    pub const MIN_NAME_LENGTH: usize = 3;
    pub const MIN_PLACE_OF_BIRTH_LENGTH: usize = 2;
    pub const MIN_ADDRESS_LENGTH: usize = 5;
    pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
    pub const STUDENT_LIST_PATH: &str = "/dashboard/students";
    pub const LOCALE: &str = "en";

    /// 配置键对应的默认值文本
    pub fn for_key(key: &str) -> Option<String> {
        use super::config_keys as k;
        let value = match key {
            k::MIN_NIS_LENGTH => MIN_NIS_LENGTH.to_string(),
            k::MIN_NAME_LENGTH => MIN_NAME_LENGTH.to_string(),
            k::MIN_PLACE_OF_BIRTH_LENGTH => MIN_PLACE_OF_BIRTH_LENGTH.to_string(),
            k::MIN_ADDRESS_LENGTH => MIN_ADDRESS_LENGTH.to_string(),
            k::MAX_FILE_BYTES => MAX_FILE_BYTES.to_string(),
            k::STUDENT_LIST_PATH => STUDENT_LIST_PATH.to_string(),
            k::LOCALE => LOCALE.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::import_config_trait::FieldRules;
    use crate::db::run_migrations;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let config = setup();
        assert_eq!(config.get_field_rules().await.unwrap(), FieldRules::default());
        assert_eq!(config.get_max_file_bytes().await.unwrap(), 5_242_880);
        assert_eq!(
            config.get_student_list_path().await.unwrap(),
            "/dashboard/students"
        );
        assert_eq!(config.get_locale().await.unwrap(), "en");
    }

    #[tokio::test]
    async fn test_override_and_bad_values_fall_back() {
        let config = setup();
        config
            .set_global_config_value(config_keys::MIN_NAME_LENGTH, "5")
            .unwrap();
        config
            .set_global_config_value(config_keys::MIN_ADDRESS_LENGTH, "lots")
            .unwrap();
        config.set_global_config_value(config_keys::LOCALE, "ID").unwrap();

        assert_eq!(config.get_min_name_length().await.unwrap(), 5);
        assert_eq!(config.get_min_address_length().await.unwrap(), 5);
        assert_eq!(config.get_locale().await.unwrap(), "id");

        let listed = config.list_global_configs().unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed.get(config_keys::MIN_NAME_LENGTH), Some(&"5".to_string()));
    }

    #[test]
    fn test_default_for_every_known_key() {
        for key in config_keys::ALL {
            assert!(defaults::for_key(key).is_some(), "missing default for {}", key);
        }
        assert!(defaults::for_key("unknown.key").is_none());
    }
}
