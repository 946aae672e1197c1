//! 会话状态：消息历史与逐条元数据
//!
//! messages 与 meta 一一对应（不变式：两者长度始终相等），只追加，重置时整体清空。

use chrono::{DateTime, Local};

/// 会话消息角色
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// 会话中的一条消息
#[derive(Clone, Debug)]
pub struct SessionMessage {
    pub role: ChatRole,
    /// 用户输入，或 Reviewer 给出的最终行程 / 错误说明
    pub content: String,
    pub delta_list: Option<String>,
    /// Planner 原始行程（详情视图）
    pub plan: Option<String>,
    /// Reviewer 完整输出（详情视图）
    pub review: Option<String>,
    pub created_at: DateTime<Local>,
}

impl SessionMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            delta_list: None,
            plan: None,
            review: None,
            created_at: Local::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            ..Self::user(content)
        }
    }

    /// 是否为一次流水线产出的行程消息（区别于错误消息）
    pub fn is_itinerary(&self) -> bool {
        self.role == ChatRole::Assistant && self.review.is_some()
    }
}

/// 消息的附加信息（如调用链说明）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnMeta {
    pub trace: String,
}

impl TurnMeta {
    pub fn trace(trace: impl Into<String>) -> Self {
        Self {
            trace: trace.into(),
        }
    }
}

/// 会话状态
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    messages: Vec<SessionMessage>,
    meta: Vec<Option<TurnMeta>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同时追加消息与其元数据，保持长度一致
    pub fn push(&mut self, message: SessionMessage, meta: Option<TurnMeta>) {
        self.messages.push(message);
        self.meta.push(meta);
        debug_assert_eq!(self.messages.len(), self.meta.len());
    }

    pub fn messages(&self) -> &[SessionMessage] {
        &self.messages
    }

    pub fn meta(&self) -> &[Option<TurnMeta>] {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.meta.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_meta_aligned_and_clear_resets() {
        let mut s = SessionState::new();
        s.push(SessionMessage::user("Rome"), None);
        s.push(SessionMessage::assistant("Day 1"), Some(TurnMeta::trace("t")));
        assert_eq!(s.messages().len(), s.meta().len());
        assert_eq!(s.messages()[1].role, ChatRole::Assistant);
        assert!(s.meta()[0].is_none());
        assert_eq!(s.meta()[1].as_ref().unwrap().trace, "t");

        s.clear();
        assert!(s.is_empty());
        assert!(s.meta().is_empty());
    }
}
