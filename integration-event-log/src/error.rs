//! 集成事件日志统一错误定义
//!
//! 覆盖参数校验、条目查找、事件类型解析、序列化、存储与配置等最小必要集合，
//! 所有发件箱操作均返回 `EventLogResult`，由调用方显式处理。
//!
use thiserror::Error;
use uuid::Uuid;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventLogError {
    // --- 前置条件 ---
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    #[error("event log entry not found: event_id={event_id}")]
    NotFound { event_id: Uuid },
    #[error("unknown event type: {short_name}")]
    UnknownEventType { short_name: String },

    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    #[error("deserialization error: type={event_type}, reason={source}")]
    Deserialization {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 存储 ---
    #[error("storage error: {reason}")]
    Storage { reason: String },
    #[cfg(feature = "infra-sqlx")]
    #[error("database error: {source}")]
    Database {
        #[from]
        source: sqlx::Error,
    },

    // --- 配置 ---
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl EventLogError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type EventLogResult<T> = Result<T, EventLogError>;

impl From<toml::de::Error> for EventLogError {
    fn from(err: toml::de::Error) -> Self {
        EventLogError::Config {
            reason: err.to_string(),
        }
    }
}

impl From<std::num::ParseIntError> for EventLogError {
    fn from(err: std::num::ParseIntError) -> Self {
        EventLogError::Config {
            reason: err.to_string(),
        }
    }
}
