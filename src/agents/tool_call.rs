//! 从 LLM 回复中识别工具调用
//!
//! 回复中含 ```json 代码块或 {...} 且可解析为 {"tool": "...", "args": {...}}、tool 非空时视为工具调用；
//! 其余一律视为最终回答（行程文本里偶尔出现的花括号不会导致失败）。

use serde::{Deserialize, Serialize};

/// LLM 返回的 Tool Call（{"tool": "internet_search", "args": {"query": "..."}}）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// 解析工具调用；无法识别时返回 None
pub fn parse_tool_call(output: &str) -> Option<ToolCall> {
    let trimmed = output.trim();

    // 尝试提取 JSON 块（```json ... ``` 或纯 JSON）
    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim())
    } else {
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        if end < start {
            return None;
        }
        &trimmed[start..=end]
    };

    let parsed: ToolCall = serde_json::from_str(json_str).ok()?;
    if parsed.tool.trim().is_empty() {
        None
    } else {
        Some(parsed)
    }
}
