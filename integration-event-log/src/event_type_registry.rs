//! 事件类型注册表（Event Type Registry）
//!
//! 在进程启动时由定义事件的模块显式注册，将短类型名映射到解码函数，
//! 读取路径据此把事件日志内容还原为具体事件。注册表以构造参数注入服务，
//! 不依赖任何全局可变状态。
//!
use crate::error::{EventLogError, EventLogResult as Result};
use crate::integration_event::{DynIntegrationEvent, INTEGRATION_EVENT_SUFFIX, IntegrationEvent};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type DecodeFn = fn(&str) -> Result<Arc<dyn DynIntegrationEvent>>;

/// 单个事件类型的注册信息
#[derive(Clone, Copy)]
pub struct EventTypeDescriptor {
    type_name: &'static str,
    short_name: &'static str,
    decode: DecodeFn,
}

impl EventTypeDescriptor {
    pub fn of<E: IntegrationEvent>() -> Self {
        Self {
            type_name: E::TYPE_NAME,
            short_name: E::short_type_name(),
            decode: decode_as::<E>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn short_name(&self) -> &'static str {
        self.short_name
    }

    /// 将 JSON 内容解码为该类型的事件
    pub fn decode(&self, content: &str) -> Result<Arc<dyn DynIntegrationEvent>> {
        (self.decode)(content)
    }
}

impl fmt::Debug for EventTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTypeDescriptor")
            .field("type_name", &self.type_name)
            .field("short_name", &self.short_name)
            .finish()
    }
}

// 字段名按 serde 默认区分大小写匹配
fn decode_as<E: IntegrationEvent>(content: &str) -> Result<Arc<dyn DynIntegrationEvent>> {
    let event: E =
        serde_json::from_str(content).map_err(|source| EventLogError::Deserialization {
            event_type: E::TYPE_NAME.to_string(),
            source,
        })?;
    let event: Arc<dyn DynIntegrationEvent> = Arc::new(event);
    Ok(event)
}

/// 事件类型注册表：短类型名 -> 解码器
#[derive(Clone, Debug, Default)]
pub struct EventTypeRegistry {
    by_short_name: HashMap<&'static str, EventTypeDescriptor>,
}

impl EventTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册事件类型；同一类型重复注册为幂等操作
    pub fn register<E: IntegrationEvent>(&mut self) -> Result<&mut Self> {
        self.register_descriptor(EventTypeDescriptor::of::<E>())?;
        Ok(self)
    }

    /// 链式注册，便于在启动代码中一次构建
    pub fn with<E: IntegrationEvent>(mut self) -> Result<Self> {
        self.register::<E>()?;
        Ok(self)
    }

    pub fn register_descriptor(&mut self, descriptor: EventTypeDescriptor) -> Result<()> {
        if !descriptor.short_name.ends_with(INTEGRATION_EVENT_SUFFIX) {
            return Err(EventLogError::invalid_argument(format!(
                "event type {} must end with {INTEGRATION_EVENT_SUFFIX}",
                descriptor.type_name
            )));
        }

        if let Some(existing) = self.by_short_name.get(descriptor.short_name) {
            if existing.type_name == descriptor.type_name {
                return Ok(());
            }
            return Err(EventLogError::invalid_argument(format!(
                "short type name {} is already registered by {}",
                descriptor.short_name, existing.type_name
            )));
        }

        self.by_short_name
            .insert(descriptor.short_name, descriptor);
        Ok(())
    }

    /// 按短类型名解析；未注册时返回 `UnknownEventType`
    pub fn resolve(&self, short_name: &str) -> Result<&EventTypeDescriptor> {
        self.by_short_name
            .get(short_name)
            .ok_or_else(|| EventLogError::UnknownEventType {
                short_name: short_name.to_string(),
            })
    }

    pub fn contains(&self, short_name: &str) -> bool {
        self.by_short_name.contains_key(short_name)
    }

    pub fn len(&self) -> usize {
        self.by_short_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_short_name.is_empty()
    }
}
