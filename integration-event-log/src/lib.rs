//! 集成事件日志基础库（integration-event-log）
//!
//! 以事务性发件箱（Transactional Outbox）模式记录集成事件：
//! - 集成事件（`integration_event`）与发布状态机（`EventState`）
//! - 事件日志条目与仓储协议（`persist`），含内存与 PostgreSQL 实现
//! - 显式的事件类型注册表（`event_type_registry`），取代运行时类型扫描
//! - 发件箱服务（`service`）：随业务事务写入事件、查询待发布事件、推进状态
//! - 配置（`config`）与统一错误（`error`）
//!
//! 典型用法：
//! 1. 使用 `#[integration_event]` 定义事件，并在启动时注册到 `EventTypeRegistry`；
//! 2. 选择 `persist` 中的仓储实现并构建 `EventLogService`；
//! 3. 在业务事务中调用 `save_event`，提交事务后由发布方拉取待发布事件；
//! 4. 发布方通过 `mark_event_as_*` 推进事件状态。
//!
pub mod config;
pub mod error;
pub mod event_type_registry;
pub mod integration_event;
pub mod persist;
pub mod service;

// 允许在本 crate 内部通过 ::integration_event_log 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::integration_event_log 路径。
extern crate self as integration_event_log;

/// 供 `#[integration_event]` 展开代码使用的依赖再导出，使用方无需直接依赖 uuid 与 chrono
#[doc(hidden)]
pub mod __private {
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
