//! 工具事件与事件记录器
//!
//! 工具在调用的各个阶段（call / result / error / end）上报 ToolEvent；EventLogger 是单槽位的接收端，
//! 每条流水线持有自己的实例并通过 ToolContext 传给工具。接收端出错或 panic 时一律吞掉，不影响工具本身。

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// 单次工具调用中的一个阶段（可序列化为 JSON 供前端展示）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolEvent {
    /// 调用开始，args 已脱敏
    Call { tool: String, args: Value },
    /// 返回结果预览（已截断、脱敏）
    Result { tool: String, preview: String },
    /// 失败信息
    Error { tool: String, error: String },
    /// 调用结束（每次调用恰好一次，且总是最后一条）
    End { tool: String },
}

impl ToolEvent {
    pub fn tool(&self) -> &str {
        match self {
            ToolEvent::Call { tool, .. }
            | ToolEvent::Result { tool, .. }
            | ToolEvent::Error { tool, .. }
            | ToolEvent::End { tool } => tool,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ToolEvent::Call { .. } => "call",
            ToolEvent::Result { .. } => "result",
            ToolEvent::Error { .. } => "error",
            ToolEvent::End { .. } => "end",
        }
    }
}

/// 事件接收端（UI 面板、日志、测试收集器等）
pub trait ToolEventSink: Send + Sync {
    fn on_event(&self, event: &ToolEvent) -> Result<(), String>;
}

impl<F> ToolEventSink for F
where
    F: Fn(&ToolEvent) -> Result<(), String> + Send + Sync,
{
    fn on_event(&self, event: &ToolEvent) -> Result<(), String> {
        self(event)
    }
}

/// 把事件转发到 mpsc 通道；接收端关闭时返回 Err（由 EventLogger 吞掉）
pub struct ChannelSink(pub mpsc::UnboundedSender<ToolEvent>);

impl ToolEventSink for ChannelSink {
    fn on_event(&self, event: &ToolEvent) -> Result<(), String> {
        self.0
            .send(event.clone())
            .map_err(|_| "tool event channel closed".to_string())
    }
}

type Slot = Arc<Mutex<Option<Arc<dyn ToolEventSink>>>>;

/// 单槽位事件记录器：clone 共享同一槽位
#[derive(Clone, Default)]
pub struct EventLogger {
    slot: Slot,
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 安装或移除接收端（None 表示移除）
    pub fn set_logger(&self, sink: Option<Arc<dyn ToolEventSink>>) {
        match self.slot.lock() {
            Ok(mut guard) => *guard = sink,
            Err(poisoned) => *poisoned.into_inner() = sink,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.current().is_some()
    }

    /// 安装接收端并返回守卫；守卫 drop 时自动移除，覆盖成功、出错与 panic 展开各条路径
    pub fn install(&self, sink: Arc<dyn ToolEventSink>) -> LoggerGuard {
        self.set_logger(Some(sink));
        LoggerGuard {
            logger: self.clone(),
        }
    }

    /// 同步投递事件；未安装时为空操作。接收端返回的错误与 panic 都不会传播给调用方
    pub fn log(&self, event: &ToolEvent) {
        let Some(sink) = self.current() else {
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| sink.on_event(event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(tool = %event.tool(), kind = event.kind(), error = %e, "tool event sink failed");
            }
            Err(_) => {
                tracing::debug!(tool = %event.tool(), kind = event.kind(), "tool event sink panicked");
            }
        }
    }

    // 先取出 Arc 再调用，避免接收端回调时持锁
    fn current(&self) -> Option<Arc<dyn ToolEventSink>> {
        match self.slot.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// install 返回的守卫：drop 时清空槽位
#[must_use = "dropping the guard uninstalls the sink immediately"]
pub struct LoggerGuard {
    logger: EventLogger,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        self.logger.set_logger(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn end(tool: &str) -> ToolEvent {
        ToolEvent::End {
            tool: tool.to_string(),
        }
    }

    #[test]
    fn test_log_without_sink_is_noop() {
        let logger = EventLogger::new();
        assert!(!logger.is_installed());
        logger.log(&end("internet_search"));
    }

    #[test]
    fn test_failing_sink_never_propagates() {
        let logger = EventLogger::new();
        logger.set_logger(Some(Arc::new(|_: &ToolEvent| -> Result<(), String> {
            Err("boom".to_string())
        })));
        logger.log(&end("a"));
        logger.log(&end("b"));
        assert!(logger.is_installed());
    }

    #[test]
    fn test_panicking_sink_is_swallowed() {
        let logger = EventLogger::new();
        logger.set_logger(Some(Arc::new(|_: &ToolEvent| -> Result<(), String> {
            panic!("sink exploded")
        })));
        logger.log(&end("a"));
        logger.log(&end("b"));
    }

    #[test]
    fn test_guard_uninstalls_on_drop() {
        let logger = EventLogger::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            let _guard = logger.install(Arc::new(move |ev: &ToolEvent| -> Result<(), String> {
                seen.lock().unwrap().push(ev.clone());
                Ok(())
            }));
            logger.log(&end("inside"));
        }
        assert!(!logger.is_installed());
        logger.log(&end("outside"));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tool(), "inside");
    }

    #[test]
    fn test_channel_sink_preserves_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let logger = EventLogger::new();
        let _guard = logger.install(Arc::new(ChannelSink(tx)));
        logger.log(&ToolEvent::Call {
            tool: "t".into(),
            args: json!({"query": "q"}),
        });
        logger.log(&end("t"));
        assert_eq!(rx.try_recv().unwrap().kind(), "call");
        assert_eq!(rx.try_recv().unwrap().kind(), "end");
    }

    #[test]
    fn test_closed_channel_is_swallowed() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let logger = EventLogger::new();
        let _guard = logger.install(Arc::new(ChannelSink(tx)));
        logger.log(&end("t"));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let ev = ToolEvent::Error {
            tool: "internet_search".into(),
            error: "nope".into(),
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v, json!({"type": "error", "tool": "internet_search", "error": "nope"}));
    }
}
