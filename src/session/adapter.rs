//! 会话适配层：把一次用户请求走完整条流水线，并把结果与工具活动投影给 UI
//!
//! handle_request 的顺序：
//! 1. 追加用户消息（meta 为空），清空活动面板
//! 2. 安装活动面板接收端（守卫），运行 Planner → Reviewer，期间推进阶段与进度
//! 3. 切分 Reviewer 输出，追加助手消息（trace 为调用链）；失败时追加错误说明（trace 为 Runtime error.）
//!
//! 守卫在离开作用域时卸载接收端，成功与失败路径一致。
//! 流水线中的 panic 被捕获为 PipelineError::Panicked，按失败轮次处理，会话继续可用。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::FutureExt;
use tokio::sync::watch;

use crate::core::{AgentPhase, PipelineError, UiState};
use crate::pipeline::{Orchestrator, PipelineResult};
use crate::session::activity::ToolActivity;
use crate::session::state::{SessionMessage, SessionState, TurnMeta};
use crate::tools::events::{EventLogger, ToolEvent, ToolEventSink};
use crate::tools::ToolContext;

/// 成功轮次的调用链说明
pub const TRACE_OK: &str = "Planner Agent → Reviewer Agent";
/// 失败轮次的说明
pub const TRACE_ERROR: &str = "Runtime error.";

const PROGRESS_REVIEWING: u16 = 40;
const PROGRESS_RENDERING: u16 = 90;
const PROGRESS_DONE: u16 = 100;

/// 面向 UI 的错误消息正文
pub fn error_message(err: &PipelineError) -> String {
    format!("⚠️ Error while processing your request:\n\n```\n{err}\n```")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn lock_activity(activity: &Mutex<ToolActivity>) -> MutexGuard<'_, ToolActivity> {
    match activity.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// 活动面板接收端：写入有界列表，并把最新面板推给 UI
struct ActivitySink {
    activity: Arc<Mutex<ToolActivity>>,
    publisher: Option<Arc<watch::Sender<UiState>>>,
}

impl ToolEventSink for ActivitySink {
    fn on_event(&self, event: &ToolEvent) -> Result<(), String> {
        let lines = {
            let mut activity = lock_activity(&self.activity);
            activity.push(event);
            activity.snapshot()
        };
        if let Some(publisher) = &self.publisher {
            if publisher.is_closed() {
                return Err("ui state channel closed".to_string());
            }
            publisher.send_modify(|state| state.activity = lines);
        }
        Ok(())
    }
}

/// 会话适配器：持有编排器、本会话的事件槽位与全部会话状态
pub struct SessionAdapter {
    orchestrator: Arc<Orchestrator>,
    events: EventLogger,
    state: SessionState,
    activity: Arc<Mutex<ToolActivity>>,
    publisher: Option<Arc<watch::Sender<UiState>>>,
    phase: AgentPhase,
    progress: u16,
    error: Option<String>,
}

impl SessionAdapter {
    pub fn new(orchestrator: Arc<Orchestrator>, max_tool_events: usize) -> Self {
        Self {
            orchestrator,
            events: EventLogger::new(),
            state: SessionState::new(),
            activity: Arc::new(Mutex::new(ToolActivity::new(max_tool_events))),
            publisher: None,
            phase: AgentPhase::Idle,
            progress: 0,
            error: None,
        }
    }

    /// 每次状态变化都把快照发布到 watch 通道
    pub fn with_publisher(mut self, publisher: Arc<watch::Sender<UiState>>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn events(&self) -> &EventLogger {
        &self.events
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn progress(&self) -> u16 {
        self.progress
    }

    /// 处理一次用户请求，返回追加到历史中的助手消息
    pub async fn handle_request(&mut self, text: &str) -> SessionMessage {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(request_id = %request_id, chars = text.chars().count(), "request start");

        self.state.push(SessionMessage::user(text), None);
        lock_activity(&self.activity).clear();
        self.error = None;

        let ctx = ToolContext::new(self.events.clone()).with_request_id(request_id.clone());
        let sink = Arc::new(ActivitySink {
            activity: self.activity.clone(),
            publisher: self.publisher.clone(),
        });
        let outcome = {
            let _guard = self.events.install(sink);
            match AssertUnwindSafe(self.run_pipeline(text, &ctx)).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => Err(PipelineError::Panicked(panic_message(payload.as_ref()))),
            }
        };

        let reply = match outcome {
            Ok(result) => {
                let reply = itinerary_message(result);
                self.state.push(reply.clone(), Some(TurnMeta::trace(TRACE_OK)));
                self.phase = AgentPhase::Idle;
                self.progress = PROGRESS_DONE;
                tracing::info!(request_id = %request_id, has_delta = reply.delta_list.is_some(), "request done");
                reply
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "request failed");
                let reply = SessionMessage::assistant(error_message(&e));
                self.state.push(reply.clone(), Some(TurnMeta::trace(TRACE_ERROR)));
                self.phase = AgentPhase::Error;
                self.progress = 0;
                self.error = Some(e.to_string());
                reply
            }
        };
        self.publish();
        reply
    }

    async fn run_pipeline(&mut self, text: &str, ctx: &ToolContext) -> Result<PipelineResult, PipelineError> {
        self.advance(AgentPhase::Planning, 0);
        let plan = self.orchestrator.run_planner(text, ctx).await?;
        self.advance(AgentPhase::Reviewing, PROGRESS_REVIEWING);
        let review = self.orchestrator.run_reviewer(&plan, ctx).await?;
        self.advance(AgentPhase::Rendering, PROGRESS_RENDERING);
        Ok(PipelineResult::from_texts(plan, review))
    }

    fn advance(&mut self, phase: AgentPhase, progress: u16) {
        self.phase = phase;
        self.progress = progress;
        self.publish();
    }

    /// 清空历史、元数据、活动面板与错误
    pub fn reset(&mut self) {
        self.state.clear();
        lock_activity(&self.activity).clear();
        self.phase = AgentPhase::Idle;
        self.progress = 0;
        self.error = None;
        tracing::info!("session reset");
        self.publish();
    }

    pub fn snapshot(&self) -> UiState {
        UiState {
            phase: self.phase,
            progress: self.progress,
            history: self.state.messages().to_vec(),
            meta: self.state.meta().to_vec(),
            activity: lock_activity(&self.activity).snapshot(),
            input_locked: self.phase.is_busy(),
            error_message: self.error.clone(),
        }
    }

    fn publish(&self) {
        if let Some(publisher) = &self.publisher {
            let _ = publisher.send(self.snapshot());
        }
    }
}

fn itinerary_message(result: PipelineResult) -> SessionMessage {
    let mut msg = SessionMessage::assistant(result.itinerary);
    msg.delta_list = result.delta_list;
    msg.plan = Some(result.plan);
    msg.review = Some(result.review);
    msg
}
