//! 内存版事件日志仓储（InMemoryEventLogRepository）
//!
//! 以 `tokio::sync::RwLock` 保护的有序表模拟发件箱表：
//! - `begin`：开启事务，写入先暂存在事务内，对读取方不可见；
//! - `commit`：整体提交暂存条目，并执行注册的业务变更回调；
//! - `rollback` 或直接丢弃事务：暂存条目与业务变更一并放弃；
//! - 写入失败（主键冲突）后事务进入中止状态，与 PostgreSQL 一致，只能回滚。
//!
//! 典型用途：测试环境、示例与本地开发。

use crate::error::{EventLogError, EventLogResult as Result};
use crate::integration_event::EventState;
use crate::persist::{EventLogEntry, EventLogTransaction, IntegrationEventLogRepository};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Table {
    // 按提交顺序保存，创建时间相同时以此为次序
    rows: Vec<EventLogEntry>,
    index: HashMap<Uuid, usize>,
}

impl Table {
    fn contains(&self, event_id: &Uuid) -> bool {
        self.index.contains_key(event_id)
    }

    fn get(&self, event_id: &Uuid) -> Option<&EventLogEntry> {
        self.index.get(event_id).map(|&i| &self.rows[i])
    }

    fn get_mut(&mut self, event_id: &Uuid) -> Option<&mut EventLogEntry> {
        self.index.get(event_id).map(|&i| &mut self.rows[i])
    }

    fn push(&mut self, entry: EventLogEntry) {
        self.index.insert(entry.event_id(), self.rows.len());
        self.rows.push(entry);
    }
}

/// 内存事件日志仓储，克隆后共享同一张表
#[derive(Clone, Default)]
pub struct InMemoryEventLogRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryEventLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开启一个新事务
    pub fn begin(&self) -> InMemoryTransaction {
        self.begin_with_id(Uuid::new_v4())
    }

    /// 以指定标识开启事务
    pub fn begin_with_id(&self, transaction_id: Uuid) -> InMemoryTransaction {
        InMemoryTransaction {
            id: transaction_id,
            table: Arc::clone(&self.table),
            staged: Vec::new(),
            on_commit: Vec::new(),
            aborted: false,
        }
    }

    /// 已提交条目数
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 已提交条目的快照（按提交顺序）
    pub async fn entries(&self) -> Vec<EventLogEntry> {
        self.table.read().await.rows.clone()
    }

    fn owns(&self, transaction: &InMemoryTransaction) -> bool {
        Arc::ptr_eq(&self.table, &transaction.table)
    }
}

impl fmt::Debug for InMemoryEventLogRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryEventLogRepository").finish_non_exhaustive()
    }
}

type CommitHook = Box<dyn FnOnce() + Send>;

/// 内存事务
pub struct InMemoryTransaction {
    id: Uuid,
    table: Arc<RwLock<Table>>,
    staged: Vec<EventLogEntry>,
    on_commit: Vec<CommitHook>,
    aborted: bool,
}

impl InMemoryTransaction {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 事务内暂存、尚未提交的条目
    pub fn staged(&self) -> &[EventLogEntry] {
        &self.staged
    }

    /// 注册与事件同事务生效的业务变更，提交时按注册顺序执行
    pub fn on_commit<F>(&mut self, change: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_commit.push(Box::new(change));
    }

    /// 提交事务：全部条目写入成功后才执行业务变更；任一主键冲突则整体失败
    pub async fn commit(self) -> Result<()> {
        let InMemoryTransaction {
            id,
            table,
            staged,
            on_commit,
            aborted,
        } = self;

        if aborted {
            debug!(
                transaction_id = %id,
                discarded = staged.len(),
                "aborted transaction rolled back"
            );
            return Err(EventLogError::storage(format!(
                "transaction {id} was aborted by a failed write"
            )));
        }

        {
            let mut table = table.write().await;
            let mut seen = HashSet::with_capacity(staged.len());
            for entry in &staged {
                if table.contains(&entry.event_id()) || !seen.insert(entry.event_id()) {
                    return Err(EventLogError::storage(format!(
                        "duplicate event log entry: event_id={}",
                        entry.event_id()
                    )));
                }
            }

            let count = staged.len();
            for entry in staged {
                table.push(entry);
            }
            debug!(transaction_id = %id, count, "in-memory transaction committed");
        }

        for change in on_commit {
            change();
        }
        Ok(())
    }

    /// 回滚事务，暂存条目与业务变更全部丢弃
    pub fn rollback(self) {
        debug!(
            transaction_id = %self.id,
            discarded = self.staged.len(),
            "in-memory transaction rolled back"
        );
    }
}

impl EventLogTransaction for InMemoryTransaction {
    fn transaction_id(&self) -> Uuid {
        self.id
    }

    fn is_active(&self) -> bool {
        !self.aborted
    }
}

impl fmt::Debug for InMemoryTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTransaction")
            .field("id", &self.id)
            .field("staged", &self.staged.len())
            .field("on_commit", &self.on_commit.len())
            .field("aborted", &self.aborted)
            .finish()
    }
}

#[async_trait]
impl IntegrationEventLogRepository for InMemoryEventLogRepository {
    type Transaction = InMemoryTransaction;

    async fn insert(
        &self,
        transaction: &mut Self::Transaction,
        entry: &EventLogEntry,
    ) -> Result<()> {
        if !self.owns(transaction) {
            return Err(EventLogError::storage(
                "transaction was not started by this repository",
            ));
        }
        if transaction.aborted {
            return Err(EventLogError::storage(format!(
                "transaction {} is aborted",
                transaction.id
            )));
        }

        let event_id = entry.event_id();
        let staged_twice = transaction
            .staged
            .iter()
            .any(|staged| staged.event_id() == event_id);
        if staged_twice || self.table.read().await.contains(&event_id) {
            transaction.aborted = true;
            return Err(EventLogError::storage(format!(
                "duplicate event log entry: event_id={event_id}"
            )));
        }

        transaction.staged.push(entry.clone());
        Ok(())
    }

    async fn find_pending(&self, transaction_id: Uuid) -> Result<Vec<EventLogEntry>> {
        let table = self.table.read().await;
        let mut pending: Vec<EventLogEntry> = table
            .rows
            .iter()
            .filter(|entry| {
                entry.transaction_id() == transaction_id
                    && entry.state() == EventState::NotPublished
            })
            .cloned()
            .collect();
        pending.sort_by_key(|entry| entry.created_time());
        Ok(pending)
    }

    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<EventLogEntry>> {
        Ok(self.table.read().await.get(&event_id).cloned())
    }

    async fn update_state(&self, entry: &EventLogEntry) -> Result<()> {
        let mut table = self.table.write().await;
        let stored = table
            .get_mut(&entry.event_id())
            .ok_or(EventLogError::NotFound {
                event_id: entry.event_id(),
            })?;
        stored.sync_state_from(entry);
        Ok(())
    }
}
