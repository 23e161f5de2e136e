use crate::error::{EventLogError, EventLogResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 事件发布状态
///
/// ```text
/// NotPublished --(开始发布)--> InPublishProgress
/// InPublishProgress --(发布成功)--> Published
/// InPublishProgress --(发布失败)--> PublishedFailed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventState {
    /// 未发布
    #[default]
    NotPublished,
    /// 发布中
    InPublishProgress,
    /// 已发布
    Published,
    /// 发布失败
    PublishedFailed,
}

impl EventState {
    /// 持久化使用的整数编码
    pub const fn code(self) -> i32 {
        match self {
            EventState::NotPublished => 0,
            EventState::InPublishProgress => 1,
            EventState::Published => 2,
            EventState::PublishedFailed => 3,
        }
    }

    pub fn from_code(code: i32) -> EventLogResult<Self> {
        match code {
            0 => Ok(EventState::NotPublished),
            1 => Ok(EventState::InPublishProgress),
            2 => Ok(EventState::Published),
            3 => Ok(EventState::PublishedFailed),
            other => Err(EventLogError::storage(format!(
                "unknown event state code: {other}"
            ))),
        }
    }

    /// 是否为终态（本子系统内不再定义后续迁移）
    pub fn is_terminal(self) -> bool {
        matches!(self, EventState::Published | EventState::PublishedFailed)
    }

    /// 是否为状态机中定义的迁移；重复进入发布中视为一次新的发布尝试
    pub fn can_transition_to(self, next: EventState) -> bool {
        matches!(
            (self, next),
            (EventState::NotPublished, EventState::InPublishProgress)
                | (EventState::InPublishProgress, EventState::InPublishProgress)
                | (EventState::InPublishProgress, EventState::Published)
                | (EventState::InPublishProgress, EventState::PublishedFailed)
        )
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventState::NotPublished => "NotPublished",
            EventState::InPublishProgress => "InPublishProgress",
            EventState::Published => "Published",
            EventState::PublishedFailed => "PublishedFailed",
        };
        f.write_str(name)
    }
}
