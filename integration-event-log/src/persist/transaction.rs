use uuid::Uuid;

/// 业务事务句柄
///
/// 事件日志条目借助该句柄与业务变更在同一事务内写入，
/// 事务提交则两者同时可见，回滚则两者同时丢弃。
pub trait EventLogTransaction: Send {
    /// 事务标识，会被记录到事件日志条目上
    fn transaction_id(&self) -> Uuid;

    /// 事务是否仍可写入
    fn is_active(&self) -> bool {
        true
    }
}
