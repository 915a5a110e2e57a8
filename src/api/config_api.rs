// ==========================================
// 学校管理系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新（global scope，仅限已知配置键）
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, defaults, ConfigManager};
use crate::i18n::SUPPORTED_LOCALES;

/// 配置项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItem {
    pub key: String,
    pub value: String,
    /// 是否为默认值（未在 config_kv 中设置）
    pub is_default: bool,
}

/// 配置管理API
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询所有已知配置（未设置的返回默认值）
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let stored = self
            .config_manager
            .list_global_configs()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let items = config_keys::ALL
            .iter()
            .map(|key| match stored.get(*key) {
                Some(value) => ConfigItem {
                    key: key.to_string(),
                    value: value.clone(),
                    is_default: false,
                },
                None => ConfigItem {
                    key: key.to_string(),
                    value: defaults::for_key(key).unwrap_or_default(),
                    is_default: true,
                },
            })
            .collect();
        Ok(items)
    }

    /// 查询单个配置
    pub fn get_config(&self, key: &str) -> ApiResult<ConfigItem> {
        let default = defaults::for_key(key)
            .ok_or_else(|| ApiError::NotFound(format!("配置项不存在: {}", key)))?;

        let stored = self
            .config_manager
            .get_global_config_value(key)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(match stored {
            Some(value) => ConfigItem {
                key: key.to_string(),
                value,
                is_default: false,
            },
            None => ConfigItem {
                key: key.to_string(),
                value: default,
                is_default: true,
            },
        })
    }

    /// 更新单个配置（写入前校验取值）
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<ConfigItem> {
        if defaults::for_key(key).is_none() {
            return Err(ApiError::NotFound(format!("配置项不存在: {}", key)));
        }
        let value = value.trim();
        validate_value(key, value)?;

        self.config_manager
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(ConfigItem {
            key: key.to_string(),
            value: value.to_string(),
            is_default: false,
        })
    }
}

fn validate_value(key: &str, value: &str) -> ApiResult<()> {
    let invalid = |message: &str| {
        Err(ApiError::ValidationError {
            field: key.to_string(),
            message: message.to_string(),
        })
    };

    match key {
        config_keys::STUDENT_LIST_PATH => {
            if !value.starts_with('/') {
                return invalid("路径必须以 / 开头");
            }
        }
        config_keys::LOCALE => {
            if !SUPPORTED_LOCALES.contains(&value) {
                return invalid("不支持的语言");
            }
        }
        config_keys::MAX_FILE_BYTES => match value.parse::<usize>() {
            Ok(n) if n > 0 => {}
            _ => return invalid("必须为正整数"),
        },
        _ => {
            if value.parse::<usize>().is_err() {
                return invalid("必须为非负整数");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_value() {
        assert!(validate_value(config_keys::MIN_NAME_LENGTH, "4").is_ok());
        assert!(validate_value(config_keys::MIN_NAME_LENGTH, "-1").is_err());
        assert!(validate_value(config_keys::MAX_FILE_BYTES, "0").is_err());
        assert!(validate_value(config_keys::LOCALE, "id").is_ok());
        assert!(validate_value(config_keys::LOCALE, "fr").is_err());
        assert!(validate_value(config_keys::STUDENT_LIST_PATH, "students").is_err());
    }
}
