//! 事件日志条目（EventLogEntry）
//!
//! 定义集成事件在发件箱表中的持久化形态，负责从事件构建条目、
//! 反序列化内容以及推进发布状态。
//!
use crate::{
    error::{EventLogError, EventLogResult as Result},
    event_type_registry::EventTypeDescriptor,
    integration_event::{DynIntegrationEvent, EventState, IntegrationEvent, short_type_name},
};
use bon::Builder;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Builder)]
pub struct EventLogEntry {
    /// 事件唯一标识（主键）
    event_id: Uuid,
    /// 事件完整类型名，用于解析反序列化目标
    event_type_name: String,
    /// 事件创建时间
    created_time: DateTime<Utc>,
    /// 事件内容（JSON）
    content: String,
    /// 发布状态
    state: EventState,
    /// 发布尝试次数
    sent_times: i32,
    /// 写入该条目的业务事务标识
    transaction_id: Uuid,
    /// 解码后的集成事件（不持久化）
    #[builder(skip)]
    integration_event: Option<Arc<dyn DynIntegrationEvent>>,
}

impl EventLogEntry {
    /// 由集成事件构建待发布的条目
    pub fn new<E>(event: &E, transaction_id: Uuid) -> Result<Self>
    where
        E: IntegrationEvent,
    {
        if E::TYPE_NAME.trim().is_empty() {
            return Err(EventLogError::invalid_argument(
                "event type name must not be blank",
            ));
        }

        Ok(Self {
            event_id: event.id(),
            event_type_name: E::TYPE_NAME.to_string(),
            created_time: event.created_time(),
            content: serde_json::to_string_pretty(event)?,
            state: EventState::NotPublished,
            sent_times: 0,
            transaction_id,
            integration_event: None,
        })
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type_name(&self) -> &str {
        &self.event_type_name
    }

    /// 事件短类型名
    pub fn event_type_short_name(&self) -> &str {
        short_type_name(&self.event_type_name)
    }

    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn state(&self) -> EventState {
        self.state
    }

    pub fn sent_times(&self) -> i32 {
        self.sent_times
    }

    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    /// 已解码的集成事件（仅在经注册表解码后存在）
    pub fn integration_event(&self) -> Option<&(dyn DynIntegrationEvent + 'static)> {
        self.integration_event.as_deref()
    }

    /// 将内容反序列化为指定事件类型
    pub fn deserialize_content<E>(&self) -> Result<E>
    where
        E: IntegrationEvent,
    {
        if E::short_type_name() != self.event_type_short_name() {
            return Err(EventLogError::TypeMismatch {
                expected: E::TYPE_NAME.to_string(),
                found: self.event_type_name.clone(),
            });
        }

        serde_json::from_str(&self.content).map_err(|source| EventLogError::Deserialization {
            event_type: self.event_type_name.clone(),
            source,
        })
    }

    /// 按注册表解析出的类型解码内容，并附着到条目上
    pub fn deserialize_json_content(mut self, descriptor: &EventTypeDescriptor) -> Result<Self> {
        let event = descriptor.decode(&self.content)?;
        self.integration_event = Some(event);
        Ok(self)
    }

    /// 迁移到新状态并返回原状态；进入发布中时累加发送次数
    pub fn transition_to(&mut self, state: EventState) -> EventState {
        let previous = self.state;
        self.state = state;
        if state == EventState::InPublishProgress {
            self.sent_times += 1;
        }
        previous
    }

    /// 仓储回写：以另一份条目的状态覆盖本条目
    pub(crate) fn sync_state_from(&mut self, other: &EventLogEntry) {
        self.state = other.state;
        self.sent_times = other.sent_times;
    }
}
