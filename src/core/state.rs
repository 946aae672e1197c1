//! 状态定义：UiState 投影
//!
//! UI 只持有轻量的 UiState（阶段、进度、历史、活动面板、锁、错误）；完整会话状态由 SessionAdapter 维护并投影到 UiState。

use crate::session::{ActivityLine, SessionMessage, TurnMeta};

/// UI 看到的「投影」状态，轻量且易于渲染
#[derive(Clone, Debug)]
pub struct UiState {
    pub phase: AgentPhase,
    /// 进度条 0..=100
    pub progress: u16,
    pub history: Vec<SessionMessage>,
    /// 与 history 逐条对应
    pub meta: Vec<Option<TurnMeta>>,
    pub activity: Vec<ActivityLine>,
    pub input_locked: bool,
    pub error_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: AgentPhase::Idle,
            progress: 0,
            history: Vec::new(),
            meta: Vec::new(),
            activity: Vec::new(),
            input_locked: false,
            error_message: None,
        }
    }
}

/// 流水线阶段（UI 投影用）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentPhase {
    Idle,
    Planning,
    Reviewing,
    Rendering,
    Error,
}

impl AgentPhase {
    /// 是否有请求在处理中
    pub fn is_busy(&self) -> bool {
        matches!(self, AgentPhase::Planning | AgentPhase::Reviewing | AgentPhase::Rendering)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgentPhase::Idle => "Idle",
            AgentPhase::Planning => "Planning itinerary…",
            AgentPhase::Reviewing => "Reviewing & fact-checking…",
            AgentPhase::Rendering => "Rendering final itinerary…",
            AgentPhase::Error => "Error",
        }
    }
}
