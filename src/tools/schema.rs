//! 工具相关 JSON Schema 生成（schemars）
//!
//! - 工具调用格式：拼入 Reviewer 的 system prompt，减少 LLM 输出格式错误
//! - 各工具参数：作为 parameters_schema 暴露给 LLM

use std::collections::HashMap;

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

/// 工具调用请求格式：与 runner 解析的 `{"tool": "...", "args": {...}}` 一致（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallFormat {
    /// 工具名，如 internet_search
    pub tool: String,
    /// 工具参数，依工具不同而不同
    pub args: HashMap<String, Value>,
}

/// internet_search 的参数
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// 搜索关键词，如 "Louvre opening hours"
    pub query: String,
}

/// 返回工具调用的 JSON Schema 字符串，可拼入 system prompt
pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}

/// internet_search 参数 schema（JSON 值）
pub fn search_args_schema() -> Value {
    serde_json::to_value(schema_for!(SearchArgs)).unwrap_or_else(|_| serde_json::json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_schema_requires_query() {
        let schema = search_args_schema();
        let required = schema["required"].as_array().cloned().unwrap_or_default();
        assert!(required.iter().any(|v| v == "query"));
    }

    #[test]
    fn test_tool_call_schema_mentions_fields() {
        let s = tool_call_schema_json();
        assert!(s.contains("\"tool\""));
        assert!(s.contains("\"args\""));
    }
}
