use super::IntegrationEvent;
use std::any::Any;
use std::fmt;
use uuid::Uuid;

/// 解码后的集成事件（类型擦除），由注册表按短类型名还原
pub trait DynIntegrationEvent: fmt::Debug + Send + Sync {
    /// 事件唯一标识
    fn event_id(&self) -> Uuid;

    /// 完整类型名
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

impl<E> DynIntegrationEvent for E
where
    E: IntegrationEvent,
{
    fn event_id(&self) -> Uuid {
        self.id()
    }

    fn type_name(&self) -> &'static str {
        E::TYPE_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn DynIntegrationEvent {
    /// 判断解码结果是否为指定事件类型
    pub fn is<E: IntegrationEvent>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// 向下转型为具体事件类型
    pub fn downcast_ref<E: IntegrationEvent>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}
