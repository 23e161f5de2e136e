use integration_event_macros::integration_event;
use integration_event_log::integration_event::IntegrationEvent;

// 短类型名与结构体名不同
#[integration_event(name = "ProductPriceChangedIntegrationEvent")]
pub struct PriceChanged {
    pub product_id: i32,
    pub new_price: i64,
    pub old_price: i64,
}

fn main() {
    let event = PriceChanged::new(1, 120, 100);
    assert_eq!(
        PriceChanged::short_type_name(),
        "ProductPriceChangedIntegrationEvent"
    );
    assert_eq!((event.product_id, event.new_price, event.old_price), (1, 120, 100));
}
