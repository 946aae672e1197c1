//! Mock LLM 客户端（无 API Key 时使用，也用于本地演示）
//!
//! Planner 请求回显一份示意行程；Reviewer 请求（system prompt 含 "Validated Itinerary"）
//! 返回带 Delta List 与 Validated Itinerary 两段的审核结果，便于离线跑通整条流水线。

use async_trait::async_trait;

use crate::llm::{LlmClient, Message, Role};

/// Mock 客户端
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        let is_reviewer = messages
            .iter()
            .any(|m| m.role == Role::System && m.content.contains("Validated Itinerary"));

        if is_reviewer {
            Ok(format!(
                "**Delta List**\n- Live fact-checking: no LLM API key configured → set OPENAI_API_KEY for real validation\n\n**Validated Itinerary**\n{}",
                last_user
            ))
        } else {
            Ok(format!(
                "**Day 1** (mock plan)\n- 09:00 Arrive and check in\n- 14:00 Explore the city centre\n\nRequest: {}",
                last_user
            ))
        }
    }
}
