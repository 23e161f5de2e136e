//! PostgreSQL 事件日志仓储（PgEventLogRepository）
//!
//! 发件箱表结构：
//!
//! ```text
//! event_id UUID PRIMARY KEY | event_type_name TEXT | created_time TIMESTAMPTZ
//! content TEXT | state INTEGER | sent_times INTEGER | transaction_id UUID
//! ```
//!
//! 条目通过 `PgEventLogTransaction` 与业务写入共用同一个数据库事务；
//! 状态以整数编码保存（见 `EventState::code`）。

use crate::config::{EventLogConfig, validate_identifier};
use crate::error::{EventLogError, EventLogResult as Result};
use crate::integration_event::EventState;
use crate::persist::{EventLogEntry, EventLogTransaction, IntegrationEventLogRepository};
use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "event_id, event_type_name, created_time, content, state, sent_times, transaction_id";

/// 包装 sqlx 事务，业务代码经 `connection()` 在同一事务内执行自己的写入
///
/// 事件写入失败后 PostgreSQL 会中止整个事务，此后 `is_active()` 返回 false。
pub struct PgEventLogTransaction {
    id: Uuid,
    inner: Transaction<'static, Postgres>,
    aborted: bool,
}

impl PgEventLogTransaction {
    pub async fn begin(pool: &PgPool) -> Result<Self> {
        Ok(Self::from_transaction(pool.begin().await?))
    }

    /// 接管调用方已开启的事务
    pub fn from_transaction(inner: Transaction<'static, Postgres>) -> Self {
        Self {
            id: Uuid::new_v4(),
            inner,
            aborted: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.inner
    }

    /// 提交事务；已中止的事务改为回滚并返回错误
    pub async fn commit(self) -> Result<()> {
        if self.aborted {
            self.inner.rollback().await?;
            return Err(EventLogError::storage(format!(
                "transaction {} was aborted by a failed write",
                self.id
            )));
        }
        self.inner.commit().await?;
        debug!(transaction_id = %self.id, "event log transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<()> {
        self.inner.rollback().await?;
        debug!(transaction_id = %self.id, "event log transaction rolled back");
        Ok(())
    }
}

impl EventLogTransaction for PgEventLogTransaction {
    fn transaction_id(&self) -> Uuid {
        self.id
    }

    fn is_active(&self) -> bool {
        !self.aborted
    }
}

/// PostgreSQL 事件日志仓储
#[derive(Clone, Debug)]
pub struct PgEventLogRepository {
    pool: PgPool,
    table: String,
}

impl PgEventLogRepository {
    /// 使用默认表名
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table: EventLogConfig::default().table_name().to_string(),
        }
    }

    /// 使用配置中的表名
    pub fn with_config(pool: PgPool, config: &EventLogConfig) -> Result<Self> {
        validate_identifier(config.table_name())?;
        Ok(Self {
            pool,
            table: config.table_name().to_string(),
        })
    }

    /// 按配置建立连接池
    pub async fn connect(config: &EventLogConfig) -> Result<Self> {
        config.validate()?;
        let url = config
            .database_url()
            .ok_or_else(|| EventLogError::config("database_url is not configured"))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections())
            .connect(url)
            .await?;
        Self::with_config(pool, config)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// 开启与该仓储同库的事务
    pub async fn begin(&self) -> Result<PgEventLogTransaction> {
        PgEventLogTransaction::begin(&self.pool).await
    }

    /// 创建发件箱表及待发布查询所用索引（幂等）
    pub async fn ensure_schema(&self) -> Result<()> {
        let create_table = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                event_id UUID PRIMARY KEY,
                event_type_name TEXT NOT NULL,
                created_time TIMESTAMPTZ NOT NULL,
                content TEXT NOT NULL,
                state INTEGER NOT NULL DEFAULT 0,
                sent_times INTEGER NOT NULL DEFAULT 0,
                transaction_id UUID NOT NULL
            )",
            table = self.table
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_pending ON {table} (transaction_id, state, created_time)",
            table = self.table
        );
        sqlx::query(&create_index).execute(&self.pool).await?;

        debug!(table = %self.table, "event log schema ensured");
        Ok(())
    }

    fn parse_row(row: &PgRow) -> Result<EventLogEntry> {
        let state: i32 = row.try_get("state")?;
        Ok(EventLogEntry::builder()
            .event_id(row.try_get("event_id")?)
            .event_type_name(row.try_get("event_type_name")?)
            .created_time(row.try_get("created_time")?)
            .content(row.try_get("content")?)
            .state(EventState::from_code(state)?)
            .sent_times(row.try_get("sent_times")?)
            .transaction_id(row.try_get("transaction_id")?)
            .build())
    }
}

#[async_trait]
impl IntegrationEventLogRepository for PgEventLogRepository {
    type Transaction = PgEventLogTransaction;

    async fn insert(
        &self,
        transaction: &mut Self::Transaction,
        entry: &EventLogEntry,
    ) -> Result<()> {
        let query = format!(
            "INSERT INTO {} ({SELECT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            self.table
        );

        let inserted = sqlx::query(&query)
            .bind(entry.event_id())
            .bind(entry.event_type_name())
            .bind(entry.created_time())
            .bind(entry.content())
            .bind(entry.state().code())
            .bind(entry.sent_times())
            .bind(entry.transaction_id())
            .execute(transaction.connection())
            .await;
        if let Err(err) = inserted {
            transaction.aborted = true;
            return Err(err.into());
        }

        debug!(
            table = %self.table,
            event_id = %entry.event_id(),
            transaction_id = %entry.transaction_id(),
            "Inserted event log entry"
        );
        Ok(())
    }

    async fn find_pending(&self, transaction_id: Uuid) -> Result<Vec<EventLogEntry>> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM {} WHERE transaction_id = $1 AND state = $2 ORDER BY created_time ASC",
            self.table
        );

        let rows = sqlx::query(&query)
            .bind(transaction_id)
            .bind(EventState::NotPublished.code())
            .fetch_all(&self.pool)
            .await?;

        let entries = rows
            .iter()
            .map(Self::parse_row)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            table = %self.table,
            %transaction_id,
            count = entries.len(),
            "Fetched pending event log entries"
        );
        Ok(entries)
    }

    async fn find_by_id(&self, event_id: Uuid) -> Result<Option<EventLogEntry>> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM {} WHERE event_id = $1",
            self.table
        );

        let row = sqlx::query(&query)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_row).transpose()
    }

    async fn update_state(&self, entry: &EventLogEntry) -> Result<()> {
        let query = format!(
            "UPDATE {} SET state = $1, sent_times = $2 WHERE event_id = $3",
            self.table
        );

        let result = sqlx::query(&query)
            .bind(entry.state().code())
            .bind(entry.sent_times())
            .bind(entry.event_id())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EventLogError::NotFound {
                event_id: entry.event_id(),
            });
        }

        debug!(
            table = %self.table,
            event_id = %entry.event_id(),
            state = %entry.state(),
            sent_times = entry.sent_times(),
            "Updated event log entry state"
        );
        Ok(())
    }
}
