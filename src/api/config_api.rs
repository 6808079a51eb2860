// ==========================================
// 报价成本核算系统 - 配置 API
// ==========================================
// 职责: 系统配置的查询与更新
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigItem, ConfigManager};
use std::sync::Arc;

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        Ok(self.config_manager.list_configs()?)
    }

    pub fn get_config(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.config_manager.get_config_value(key)?)
    }

    /// 更新配置值（数值类配置在此做合法性校验）
    pub fn set_config(&self, key: &str, value: &str) -> ApiResult<()> {
        match key {
            config_keys::DEFAULT_TAX_PCT | config_keys::DEFAULT_RESERVE_PCT => {
                let pct = value.parse::<f64>().map_err(|_| {
                    ApiError::InvalidInput(format!("{} 必须是数值: {}", key, value))
                })?;
                if !(0.0..=100.0).contains(&pct) {
                    return Err(ApiError::InvalidInput(format!(
                        "{} 必须在 0~100 之间: {}",
                        key, value
                    )));
                }
            }
            config_keys::DEFAULT_FX_RATE => {
                let rate = value.parse::<f64>().map_err(|_| {
                    ApiError::InvalidInput(format!("{} 必须是数值: {}", key, value))
                })?;
                if rate <= 0.0 {
                    return Err(ApiError::InvalidInput(format!(
                        "{} 必须为正数: {}",
                        key, value
                    )));
                }
            }
            config_keys::DEFAULT_VALIDITY_DAYS => {
                let days = value.parse::<i32>().map_err(|_| {
                    ApiError::InvalidInput(format!("{} 必须是整数: {}", key, value))
                })?;
                if days <= 0 {
                    return Err(ApiError::InvalidInput(format!(
                        "{} 必须为正数: {}",
                        key, value
                    )));
                }
            }
            _ => {}
        }
        self.config_manager.set_config_value(key, value)?;
        Ok(())
    }
}
