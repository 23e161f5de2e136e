use anyhow::Context;
use integration_event_log::config::EventLogConfig;
use integration_event_log::event_type_registry::EventTypeRegistry;
use integration_event_log::persist::{EventLogTransaction, InMemoryEventLogRepository};
use integration_event_log::service::{EventLogService, IntegrationEventLogService};
use integration_event_macros::integration_event;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[integration_event]
pub struct OrderStartedIntegrationEvent {
    pub user_id: String,
    pub order_id: i64,
}

#[integration_event]
pub struct ProductPriceChangedIntegrationEvent {
    pub product_id: i32,
    pub new_price: i64,
    pub old_price: i64,
}

/// LOG_FORMAT=json 输出 JSON，否则为文本；级别由 RUST_LOG 控制（默认 info）
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// 商品目录（业务数据），仅在事务提交时更新
#[derive(Clone, Default)]
struct Catalog {
    prices: Arc<Mutex<HashMap<i32, i64>>>,
}

impl Catalog {
    fn price(&self, product_id: i32) -> Option<i64> {
        self.prices
            .lock()
            .ok()
            .and_then(|prices| prices.get(&product_id).copied())
    }
}

/// 在同一事务内修改价格并写入价格变更事件，返回事务标识
async fn change_price(
    service: &EventLogService<InMemoryEventLogRepository>,
    catalog: &Catalog,
    product_id: i32,
    new_price: i64,
) -> anyhow::Result<Uuid> {
    let old_price = catalog.price(product_id).unwrap_or_default();
    let event = ProductPriceChangedIntegrationEvent::new(product_id, new_price, old_price);

    let mut tx = service.repository().begin();
    let prices = Arc::clone(&catalog.prices);
    tx.on_commit(move || {
        if let Ok(mut prices) = prices.lock() {
            prices.insert(product_id, new_price);
        }
    });
    service.save_event(&event, &mut tx).await?;

    let transaction_id = tx.transaction_id();
    tx.commit().await?;
    info!(product_id, old_price, new_price, %transaction_id, "price changed");
    Ok(transaction_id)
}

/// 模拟发布方：拉取待发布事件并逐一推进状态
async fn publish_pending(
    service: &EventLogService<InMemoryEventLogRepository>,
    transaction_id: Uuid,
) -> anyhow::Result<()> {
    let pending = service
        .retrieve_event_logs_pending_to_publish(transaction_id)
        .await?;

    for entry in pending {
        let event_id = entry.event_id();
        service.mark_event_as_in_publish_progress(event_id).await?;

        match entry.integration_event() {
            Some(event) => {
                info!(%event_id, event_type = event.type_name(), "publishing integration event");
                service.mark_event_as_published(event_id).await?;
            }
            None => {
                warn!(%event_id, "integration event was not decoded");
                service.mark_event_as_published_failed(event_id).await?;
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config_path = std::env::var_os("EVENT_LOG_CONFIG").map(PathBuf::from);
    let config = EventLogConfig::load(config_path.as_deref()).context("load event log config")?;
    info!(table = config.table_name(), "event log configured");

    let registry = EventTypeRegistry::new()
        .with::<OrderStartedIntegrationEvent>()?
        .with::<ProductPriceChangedIntegrationEvent>()?;
    let service = EventLogService::builder()
        .repository(InMemoryEventLogRepository::new())
        .event_types(registry)
        .build();
    let catalog = Catalog::default();

    // 下单：保存事件、提交、发布
    let mut tx = service.repository().begin();
    let order_tx = tx.transaction_id();
    let order = OrderStartedIntegrationEvent::new("alice".to_string(), 42);
    service.save_event(&order, &mut tx).await?;
    tx.commit().await?;
    publish_pending(&service, order_tx).await?;

    // 改价：业务变更与事件同一事务
    let price_tx = change_price(&service, &catalog, 1, 1200).await?;
    publish_pending(&service, price_tx).await?;
    let price_tx = change_price(&service, &catalog, 1, 990).await?;
    publish_pending(&service, price_tx).await?;

    // 回滚：价格与事件都不生效
    let mut tx = service.repository().begin();
    let rolled_back = ProductPriceChangedIntegrationEvent::new(1, 1, 990);
    service.save_event(&rolled_back, &mut tx).await?;
    tx.rollback();

    for entry in service.repository().entries().await {
        info!(
            event_id = %entry.event_id(),
            event_type = entry.event_type_short_name(),
            state = %entry.state(),
            sent_times = entry.sent_times(),
            "event log entry"
        );
    }
    info!(price = ?catalog.price(1), "final catalog price");
    Ok(())
}
