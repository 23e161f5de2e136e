use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use uuid::Uuid;

/// 集成事件短类型名必须携带的后缀
pub const INTEGRATION_EVENT_SUFFIX: &str = "IntegrationEvent";

/// 集成事件载荷需要满足的通用能力边界
pub trait IntegrationEvent:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 完整类型名（形如 `ordering::events::OrderStartedIntegrationEvent`）
    const TYPE_NAME: &'static str;

    /// 事件唯一标识
    fn id(&self) -> Uuid;

    /// 事件创建时间
    fn created_time(&self) -> DateTime<Utc>;

    /// 短类型名，用于在注册表中解析反序列化目标
    fn short_type_name() -> &'static str {
        short_type_name(Self::TYPE_NAME)
    }
}

/// 取完整类型名的最后一段，兼容 `::` 与 `.` 两种分隔
pub fn short_type_name(type_name: &str) -> &str {
    type_name
        .rsplit(|c: char| c == ':' || c == '.')
        .next()
        .unwrap_or(type_name)
}

#[cfg(test)]
mod tests {
    use super::short_type_name;

    #[test]
    fn short_name_of_rust_path() {
        assert_eq!(
            short_type_name("catalog::events::ProductPriceChangedIntegrationEvent"),
            "ProductPriceChangedIntegrationEvent"
        );
    }

    #[test]
    fn short_name_of_dotted_name() {
        assert_eq!(
            short_type_name("Ordering.Api.IntegrationEvents.OrderStartedIntegrationEvent"),
            "OrderStartedIntegrationEvent"
        );
    }

    #[test]
    fn short_name_without_separator_is_itself() {
        assert_eq!(short_type_name("PlainIntegrationEvent"), "PlainIntegrationEvent");
    }
}
