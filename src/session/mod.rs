//! 会话层：消息历史、工具活动面板、请求生命周期

pub mod activity;
pub mod adapter;
pub mod state;

pub use activity::{render_event, ActivityLevel, ActivityLine, ToolActivity};
pub use adapter::{error_message, SessionAdapter, TRACE_ERROR, TRACE_OK};
pub use state::{ChatRole, SessionMessage, SessionState, TurnMeta};
