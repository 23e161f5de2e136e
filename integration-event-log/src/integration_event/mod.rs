//! 集成事件（Integration Event）与发布状态
//!
//! 定义事件载荷需要实现的最小接口（`IntegrationEvent`）、解码后的类型擦除视图
//! （`DynIntegrationEvent`）以及发件箱条目的发布状态机（`EventState`）。

mod dyn_integration_event;
mod event_state;
mod integration_event_trait;

pub use dyn_integration_event::DynIntegrationEvent;
pub use event_state::EventState;
pub use integration_event_trait::{INTEGRATION_EVENT_SUFFIX, IntegrationEvent, short_type_name};
