//! 工具活动面板：把 ToolEvent 渲染成展示行，按到达顺序保留最近 N 条

use std::collections::VecDeque;

use crate::tools::events::ToolEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityLevel {
    Info,
    /// 错误行高亮显示
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityLine {
    pub level: ActivityLevel,
    pub text: String,
}

/// 单条事件的展示文本
pub fn render_event(event: &ToolEvent) -> ActivityLine {
    match event {
        ToolEvent::Call { tool, args } => ActivityLine {
            level: ActivityLevel::Info,
            text: format!("{tool} called with `{args}`"),
        },
        ToolEvent::Result { tool, preview } => ActivityLine {
            level: ActivityLevel::Info,
            text: format!("{tool} result preview: {preview}"),
        },
        ToolEvent::Error { tool, error } => ActivityLine {
            level: ActivityLevel::Error,
            text: format!("{tool} error: {error}"),
        },
        ToolEvent::End { tool } => ActivityLine {
            level: ActivityLevel::Info,
            text: format!("{tool} finished"),
        },
    }
}

/// 有界的活动记录
#[derive(Clone, Debug)]
pub struct ToolActivity {
    lines: VecDeque<ActivityLine>,
    capacity: usize,
}

impl ToolActivity {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, event: &ToolEvent) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(render_event(event));
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn snapshot(&self) -> Vec<ActivityLine> {
        self.lines.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_each_kind() {
        let call = render_event(&ToolEvent::Call {
            tool: "internet_search".into(),
            args: json!({"query": "Louvre"}),
        });
        assert_eq!(call.text, "internet_search called with `{\"query\":\"Louvre\"}`");
        let err = render_event(&ToolEvent::Error {
            tool: "internet_search".into(),
            error: "boom".into(),
        });
        assert_eq!(err.level, ActivityLevel::Error);
        let end = render_event(&ToolEvent::End {
            tool: "internet_search".into(),
        });
        assert_eq!(end.text, "internet_search finished");
    }

    #[test]
    fn test_keeps_last_n_in_order() {
        let mut a = ToolActivity::new(60);
        for i in 0..75 {
            a.push(&ToolEvent::End {
                tool: format!("t{i}"),
            });
        }
        let lines = a.snapshot();
        assert_eq!(lines.len(), 60);
        assert_eq!(lines[0].text, "t15 finished");
        assert_eq!(lines[59].text, "t74 finished");
    }
}
