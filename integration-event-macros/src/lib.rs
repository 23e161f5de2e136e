use proc_macro::TokenStream;

mod derive_utils;
mod field_utils;
mod integration_event;

/// 集成事件宏
///
/// ```ignore
/// use integration_event_macros::integration_event;
///
/// #[integration_event]
/// pub struct OrderStartedIntegrationEvent {
///     pub order_id: i64,
/// }
///
/// let event = OrderStartedIntegrationEvent::new(42);
/// ```
///
/// 展开后结构体带有 `id`、`created_time` 字段与 `new` 构造函数，
/// 并实现 `IntegrationEvent`，可直接注册到 `EventTypeRegistry`。
#[proc_macro_attribute]
pub fn integration_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    integration_event::expand(attr, item)
}
