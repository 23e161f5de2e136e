use integration_event_log::__private::{DateTime, Utc, Uuid};
use integration_event_log::event_type_registry::EventTypeRegistry;
use integration_event_macros::integration_event;

// 用户自行声明 id/created_time 与部分派生，宏负责补齐与去重
#[integration_event]
#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct StockRejectedIntegrationEvent {
    order_stock_items: Vec<i32>,
    created_time: DateTime<Utc>,
    id: Uuid,
}

#[integration_event]
struct EmptyIntegrationEvent {}

fn main() {
    let event = StockRejectedIntegrationEvent::new(vec![1, 2]);
    let json = serde_json::to_value(&event).unwrap();
    assert!(json.get("orderStockItems").is_some());
    assert!(json.get("createdTime").is_some());

    let empty = EmptyIntegrationEvent::new();
    assert_ne!(empty.id, event.id);

    let registry = EventTypeRegistry::new()
        .with::<StockRejectedIntegrationEvent>()
        .and_then(|r| r.with::<EmptyIntegrationEvent>())
        .unwrap();
    assert_eq!(registry.len(), 2);
}
