//! 发件箱持久化（persist）
//!
//! 定义事件日志条目、业务事务句柄与事件日志仓储协议，并提供：
//! - 内存实现（`inmemory` 特性，默认开启）；
//! - PostgreSQL 实现（`infra-sqlx` 特性）。
//!
mod event_log_entry;
mod event_log_repository;
mod transaction;

#[cfg(feature = "inmemory")]
mod inmemory;
#[cfg(feature = "infra-sqlx")]
mod postgres;

pub use event_log_entry::EventLogEntry;
pub use event_log_repository::IntegrationEventLogRepository;
pub use transaction::EventLogTransaction;

#[cfg(feature = "inmemory")]
pub use inmemory::{InMemoryEventLogRepository, InMemoryTransaction};
#[cfg(feature = "infra-sqlx")]
pub use postgres::{PgEventLogRepository, PgEventLogTransaction};
