use crate::error::EventLogResult as Result;
use crate::persist::{EventLogEntry, EventLogTransaction};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// 事件日志仓储协议
///
/// - `insert`：在调用方的业务事务中写入条目，随事务提交生效；
/// - `find_pending`：读取某事务写入且仍未发布的条目（按创建时间升序）；
/// - `find_by_id` / `update_state`：按事件标识读取与回写状态。
#[async_trait]
pub trait IntegrationEventLogRepository: Send + Sync {
    type Transaction: EventLogTransaction;

    async fn insert(
        &self,
        transaction: &mut Self::Transaction,
        entry: &EventLogEntry,
    ) -> Result<()>;

    async fn find_pending(&self, transaction_id: Uuid) -> Result<Vec<EventLogEntry>>;

    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<EventLogEntry>>;

    /// 回写状态与发送次数；条目不存在时返回 `NotFound`
    async fn update_state(&self, entry: &EventLogEntry) -> Result<()>;
}

#[async_trait]
impl<T> IntegrationEventLogRepository for Arc<T>
where
    T: IntegrationEventLogRepository + ?Sized,
{
    type Transaction = T::Transaction;

    async fn insert(
        &self,
        transaction: &mut Self::Transaction,
        entry: &EventLogEntry,
    ) -> Result<()> {
        (**self).insert(transaction, entry).await
    }

    async fn find_pending(&self, transaction_id: Uuid) -> Result<Vec<EventLogEntry>> {
        (**self).find_pending(transaction_id).await
    }

    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<EventLogEntry>> {
        (**self).find_by_id(event_id).await
    }

    async fn update_state(&self, entry: &EventLogEntry) -> Result<()> {
        (**self).update_state(entry).await
    }
}
