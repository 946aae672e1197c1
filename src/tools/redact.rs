//! 日志脱敏：屏蔽敏感子串、截断过长文本
//!
//! 对 JSON 值递归处理（对象 / 数组 / 字符串），其余类型原样返回；纯函数，任何输入都不会失败。

use serde_json::{Map, Value};

/// 脱敏后的占位文本
pub const REDACTED: &str = "[redacted]";
/// 截断标记（追加在保留的前缀之后）
pub const TRUNCATION_MARKER: &str = " […]";

/// 字符串内容命中即整体替换
const SENSITIVE_VALUE_PATTERNS: &[&str] = &["api_key", "token", "secret", "password"];
/// 对象键命中即替换其值（不论值的内容）
const SENSITIVE_KEY_PATTERNS: &[&str] = &["key", "token", "secret", "password"];

/// 超过此字符数的字符串会被截断
const MAX_PLAIN_CHARS: usize = 300;
/// 截断时保留的前缀字符数
const KEEP_CHARS: usize = 120;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let low = haystack.to_lowercase();
    needles.iter().any(|n| low.contains(n))
}

/// 字符串规则：含敏感子串 → `[redacted]`；超过 300 字符 → 前 120 字符 + 截断标记；否则原样
pub fn redact_str(value: &str) -> String {
    if contains_any(value, SENSITIVE_VALUE_PATTERNS) {
        return REDACTED.to_string();
    }
    if value.chars().count() > MAX_PLAIN_CHARS {
        let head: String = value.chars().take(KEEP_CHARS).collect();
        return head + TRUNCATION_MARKER;
    }
    value.to_string()
}

/// 递归脱敏，保持结构（对象键集合、数组顺序与长度不变）
pub fn redact(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(redact_str(s)),
        Value::Object(map) => {
            let out: Map<String, Value> = map
                .iter()
                .map(|(k, v)| {
                    let v = if contains_any(k, SENSITIVE_KEY_PATTERNS) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact(v)
                    };
                    (k.clone(), v)
                })
                .collect();
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_key_any_case_is_redacted() {
        assert_eq!(redact_str("my API_KEY is abc"), REDACTED);
        assert_eq!(redact_str("Api_Key=1"), REDACTED);
        assert_eq!(redact(&json!("use api_key")), json!(REDACTED));
    }

    #[test]
    fn test_short_plain_string_unchanged() {
        let s = "Louvre opening hours";
        assert_eq!(redact_str(s), s);
        let exactly = "a".repeat(300);
        assert_eq!(redact_str(&exactly), exactly);
    }

    #[test]
    fn test_long_string_truncated() {
        let long = "b".repeat(301);
        let out = redact_str(&long);
        assert!(out.chars().count() <= 124);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert!(out.starts_with(&"b".repeat(120)));
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let long = "é".repeat(400);
        let out = redact_str(&long);
        assert_eq!(out.chars().count(), 120 + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn test_sensitive_key_redacts_nested_value() {
        let v = json!({
            "access_token": {"inner": ["a", "b"], "n": 1},
            "query": "museums in Paris",
        });
        let out = redact(&v);
        assert_eq!(out["access_token"], json!(REDACTED));
        assert_eq!(out["query"], json!("museums in Paris"));
    }

    #[test]
    fn test_key_match_is_case_insensitive() {
        let out = redact(&json!({"X-Api-KEY": "plain", "Password": 3}));
        assert_eq!(out["X-Api-KEY"], json!(REDACTED));
        assert_eq!(out["Password"], json!(REDACTED));
    }

    #[test]
    fn test_array_preserves_order_and_length() {
        let out = redact(&json!(["one", "my secret", 2, null]));
        assert_eq!(out, json!(["one", REDACTED, 2, null]));
    }

    #[test]
    fn test_non_string_scalars_untouched() {
        assert_eq!(redact(&json!(42)), json!(42));
        assert_eq!(redact(&json!(true)), json!(true));
        assert_eq!(redact(&Value::Null), Value::Null);
    }
}
