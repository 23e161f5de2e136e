//! 事件日志配置
//!
//! 支持 TOML 文件与环境变量覆盖：
//! - `EVENT_LOG_TABLE_NAME`：发件箱表名
//! - `EVENT_LOG_DATABASE_URL`：PostgreSQL 连接串
//! - `EVENT_LOG_MAX_CONNECTIONS`：连接池上限
//!
use crate::error::{EventLogError, EventLogResult as Result};
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_TABLE_NAME: &str = "EVENT_LOG_TABLE_NAME";
pub const ENV_DATABASE_URL: &str = "EVENT_LOG_DATABASE_URL";
pub const ENV_MAX_CONNECTIONS: &str = "EVENT_LOG_MAX_CONNECTIONS";

const DEFAULT_TABLE_NAME: &str = "integration_event_log";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// 发件箱表名
    #[builder(default = DEFAULT_TABLE_NAME.to_string(), into)]
    table_name: String,
    /// 数据库连接串（仅 PostgreSQL 仓储需要）
    #[builder(into)]
    database_url: Option<String>,
    /// 连接池上限
    #[builder(default = DEFAULT_MAX_CONNECTIONS)]
    max_connections: u32,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl EventLogConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 读取配置：有文件则解析文件，否则使用默认值；随后应用环境变量并校验
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|err| {
                    EventLogError::config(format!("failed to read {}: {err}", path.display()))
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 以进程环境变量覆盖配置
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// 以给定的查找函数覆盖配置
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(table_name) = lookup(ENV_TABLE_NAME) {
            self.table_name = table_name;
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database_url = Some(url);
        }
        if let Some(max) = lookup(ENV_MAX_CONNECTIONS) {
            self.max_connections = max.trim().parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table_name)?;
        if self.max_connections == 0 {
            return Err(EventLogError::config("max_connections must be positive"));
        }
        Ok(())
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

/// 表名会拼接进 SQL，只允许字母、数字与下划线，且不以数字开头
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(EventLogError::config(format!(
            "invalid table name: {name:?}"
        )))
    }
}
