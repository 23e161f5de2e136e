use integration_event_macros::integration_event;
use integration_event_log::integration_event::IntegrationEvent;

#[integration_event]
pub struct OrderStartedIntegrationEvent {
    pub user_id: String,
}

fn main() {
    let event = OrderStartedIntegrationEvent::new("u-1".to_string());
    assert_eq!(event.user_id, "u-1");
    assert_eq!(event.id(), event.id);
    assert!(!event.id.is_nil());
    assert_eq!(
        OrderStartedIntegrationEvent::short_type_name(),
        "OrderStartedIntegrationEvent"
    );
    assert!(OrderStartedIntegrationEvent::TYPE_NAME.ends_with("::OrderStartedIntegrationEvent"));

    let json = serde_json::to_string(&event).unwrap();
    let restored: OrderStartedIntegrationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, event);
}
