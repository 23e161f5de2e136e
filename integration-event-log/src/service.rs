//! 发件箱服务（IntegrationEventLogService）
//!
//! 面向业务方与发布方的统一入口：
//! - 业务方在自己的事务中调用 `save_event`，事件与业务变更同生共死；
//! - 发布方按事务标识拉取待发布事件（已按注册表解码），投递后推进状态。
//!
//! 状态推进采用“先读后写”，不加锁也不做乐观并发校验，
//! 同一事件存在多个发布方时以最后一次写入为准。
//!
use crate::error::{EventLogError, EventLogResult as Result};
use crate::event_type_registry::EventTypeRegistry;
use crate::integration_event::{EventState, IntegrationEvent};
use crate::persist::{EventLogEntry, EventLogTransaction, IntegrationEventLogRepository};
use async_trait::async_trait;
use bon::Builder;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

// 导入由 bon::Builder 生成的 typestate 模块与状态转换别名
use self::event_log_service_builder::{IsUnset, SetRegistry, State as BuilderState};

#[async_trait]
pub trait IntegrationEventLogService: Send + Sync {
    type Transaction: EventLogTransaction;

    /// 查询某事务写入且尚未发布的事件（按创建时间升序，已解码）
    async fn retrieve_event_logs_pending_to_publish(
        &self,
        transaction_id: Uuid,
    ) -> Result<Vec<EventLogEntry>>;

    /// 在业务事务中写入事件
    async fn save_event<E>(&self, event: &E, transaction: &mut Self::Transaction) -> Result<()>
    where
        E: IntegrationEvent;

    async fn mark_event_as_published(&self, event_id: Uuid) -> Result<()>;

    async fn mark_event_as_in_publish_progress(&self, event_id: Uuid) -> Result<()>;

    async fn mark_event_as_published_failed(&self, event_id: Uuid) -> Result<()>;
}

/// 基于事件日志仓储与事件类型注册表的服务实现
#[derive(Builder)]
pub struct EventLogService<R>
where
    R: IntegrationEventLogRepository,
{
    repository: R,
    registry: Arc<EventTypeRegistry>,
}

impl<R, S> EventLogServiceBuilder<R, S>
where
    R: IntegrationEventLogRepository,
    S: BuilderState,
{
    /// 直接接收注册表，内部包装为 `Arc`
    pub fn event_types(
        self,
        registry: EventTypeRegistry,
    ) -> EventLogServiceBuilder<R, SetRegistry<S>>
    where
        <S as BuilderState>::Registry: IsUnset,
    {
        self.registry(Arc::new(registry))
    }
}

impl<R> EventLogService<R>
where
    R: IntegrationEventLogRepository,
{
    pub fn new(repository: R, registry: Arc<EventTypeRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn registry(&self) -> &EventTypeRegistry {
        &self.registry
    }

    async fn update_event_state(&self, event_id: Uuid, state: EventState) -> Result<()> {
        let mut entry = self
            .repository
            .find_by_id(event_id)
            .await?
            .ok_or(EventLogError::NotFound { event_id })?;

        let previous = entry.transition_to(state);
        if !previous.can_transition_to(state) {
            warn!(
                %event_id,
                from = %previous,
                to = %state,
                terminal = previous.is_terminal(),
                "undefined event state transition"
            );
        }

        self.repository.update_state(&entry).await?;

        debug!(
            %event_id,
            from = %previous,
            to = %state,
            sent_times = entry.sent_times(),
            "event state updated"
        );
        Ok(())
    }
}

#[async_trait]
impl<R> IntegrationEventLogService for EventLogService<R>
where
    R: IntegrationEventLogRepository,
{
    type Transaction = R::Transaction;

    async fn retrieve_event_logs_pending_to_publish(
        &self,
        transaction_id: Uuid,
    ) -> Result<Vec<EventLogEntry>> {
        let mut pending = self.repository.find_pending(transaction_id).await?;
        if pending.is_empty() {
            return Ok(pending);
        }

        // 稳定排序：创建时间相同的条目保持仓储返回的次序
        pending.sort_by_key(|entry| entry.created_time());

        let entries = pending
            .into_iter()
            .map(|entry| {
                let descriptor = self.registry.resolve(entry.event_type_short_name())?;
                entry.deserialize_json_content(descriptor)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            %transaction_id,
            count = entries.len(),
            "retrieved event logs pending to publish"
        );
        Ok(entries)
    }

    async fn save_event<E>(&self, event: &E, transaction: &mut Self::Transaction) -> Result<()>
    where
        E: IntegrationEvent,
    {
        let transaction_id = transaction.transaction_id();
        if transaction_id.is_nil() {
            return Err(EventLogError::invalid_argument(
                "transaction id must not be nil",
            ));
        }
        if !transaction.is_active() {
            return Err(EventLogError::invalid_argument(format!(
                "transaction {transaction_id} is no longer active"
            )));
        }

        let entry = EventLogEntry::new(event, transaction_id)?;
        if !self.registry.contains(entry.event_type_short_name()) {
            warn!(
                event_type = entry.event_type_name(),
                "saving an integration event whose type is not registered"
            );
        }

        self.repository.insert(transaction, &entry).await?;

        debug!(
            event_id = %entry.event_id(),
            event_type = entry.event_type_short_name(),
            %transaction_id,
            "integration event saved"
        );
        Ok(())
    }

    async fn mark_event_as_published(&self, event_id: Uuid) -> Result<()> {
        self.update_event_state(event_id, EventState::Published)
            .await
    }

    async fn mark_event_as_in_publish_progress(&self, event_id: Uuid) -> Result<()> {
        self.update_event_state(event_id, EventState::InPublishProgress)
            .await
    }

    async fn mark_event_as_published_failed(&self, event_id: Uuid) -> Result<()> {
        self.update_event_state(event_id, EventState::PublishedFailed)
            .await
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::{EventLogService, IntegrationEventLogService};
    use crate::error::EventLogError;
    use crate::event_type_registry::EventTypeRegistry;
    use crate::integration_event::EventState;
    use crate::persist::{
        EventLogTransaction, InMemoryEventLogRepository, IntegrationEventLogRepository,
    };
    use integration_event_macros::integration_event;
    use uuid::Uuid;

    #[integration_event]
    struct GracePeriodConfirmedIntegrationEvent {
        order_id: i64,
    }

    #[integration_event]
    struct UserCheckoutAcceptedIntegrationEvent {
        user_id: String,
    }

    fn service() -> EventLogService<InMemoryEventLogRepository> {
        EventLogService::builder()
            .repository(InMemoryEventLogRepository::new())
            .event_types(
                EventTypeRegistry::new()
                    .with::<GracePeriodConfirmedIntegrationEvent>()
                    .unwrap(),
            )
            .build()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn nil_transaction_is_invalid_argument() {
        let service = service();
        let mut tx = service.repository().begin_with_id(Uuid::nil());

        let err = service
            .save_event(&GracePeriodConfirmedIntegrationEvent::new(1), &mut tx)
            .await
            .unwrap_err();
        assert!(matches!(err, EventLogError::InvalidArgument { .. }));
        assert!(tx.staged().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn retrieve_decodes_registered_events() {
        let service = service();
        let mut tx = service.repository().begin();
        let tx_id = tx.transaction_id();
        let event = GracePeriodConfirmedIntegrationEvent::new(7);

        service.save_event(&event, &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        let pending = service
            .retrieve_event_logs_pending_to_publish(tx_id)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        let decoded = pending[0]
            .integration_event()
            .and_then(|e| e.downcast_ref::<GracePeriodConfirmedIntegrationEvent>());
        assert_eq!(decoded, Some(&event));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unregistered_type_is_saved_but_not_retrievable() {
        let service = service();
        let mut tx = service.repository().begin();
        let tx_id = tx.transaction_id();

        service
            .save_event(
                &UserCheckoutAcceptedIntegrationEvent::new("bob".into()),
                &mut tx,
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        match service
            .retrieve_event_logs_pending_to_publish(tx_id)
            .await
            .unwrap_err()
        {
            EventLogError::UnknownEventType { short_name } => {
                assert_eq!(short_name, "UserCheckoutAcceptedIntegrationEvent")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn retry_after_failure_counts_again() {
        let service = service();
        let mut tx = service.repository().begin();
        let event = GracePeriodConfirmedIntegrationEvent::new(3);
        service.save_event(&event, &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        service
            .mark_event_as_in_publish_progress(event.id)
            .await
            .unwrap();
        service
            .mark_event_as_published_failed(event.id)
            .await
            .unwrap();
        service
            .mark_event_as_in_publish_progress(event.id)
            .await
            .unwrap();

        let stored = service
            .repository()
            .find_by_id(event.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.state(), EventState::InPublishProgress);
        assert_eq!(stored.sent_times(), 2);
    }
}
