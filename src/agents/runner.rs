//! Agent 执行边界
//!
//! AgentRunner 以 (AgentConfig, 输入文本, ToolContext) 运行一次 Agent，返回实现 AgentOutput 的结果对象。
//! LlmAgentRunner 是基于 LlmClient 的实现：拼 system prompt（指令 + 已授权工具说明），
//! 若回复是已授权工具的 JSON 调用则经 ToolExecutor 执行并把 Observation 追加回对话，直到得到最终文本。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::tool_call::parse_tool_call;
use crate::agents::AgentConfig;
use crate::core::AgentError;
use crate::llm::{LlmClient, Message};
use crate::tools::schema::tool_call_schema_json;
use crate::tools::{ToolContext, ToolExecutor};

/// 运行结果的访问约定：final_output 优先，其次 text，最后退回 Display
pub trait AgentOutput: fmt::Display + Send + Sync {
    fn final_output(&self) -> Option<&str> {
        None
    }

    fn text(&self) -> Option<&str> {
        None
    }
}

/// 纯文本结果（只有 Display）
impl AgentOutput for String {}

/// Agent 执行边界
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(
        &self,
        agent: &AgentConfig,
        input: &str,
        ctx: &ToolContext,
    ) -> Result<Box<dyn AgentOutput>, AgentError>;
}

/// LlmAgentRunner 的运行结果
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub agent: String,
    pub final_output: Option<String>,
}

impl fmt::Display for RunOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.final_output {
            Some(out) => f.write_str(out),
            None => write!(f, "{} produced no output", self.agent),
        }
    }
}

impl AgentOutput for RunOutput {
    fn final_output(&self) -> Option<&str> {
        self.final_output.as_deref()
    }
}

/// 基于 LlmClient 的 Agent 运行器：按模型名选择客户端，工具调用受步数上限约束
pub struct LlmAgentRunner {
    default_llm: Arc<dyn LlmClient>,
    models: HashMap<String, Arc<dyn LlmClient>>,
    executor: Arc<ToolExecutor>,
    max_tool_steps: usize,
}

impl LlmAgentRunner {
    pub fn new(default_llm: Arc<dyn LlmClient>, executor: Arc<ToolExecutor>, max_tool_steps: usize) -> Self {
        Self {
            default_llm,
            models: HashMap::new(),
            executor,
            max_tool_steps,
        }
    }

    /// 为指定模型名注册专用客户端
    pub fn with_model(mut self, model: impl Into<String>, llm: Arc<dyn LlmClient>) -> Self {
        self.models.insert(model.into(), llm);
        self
    }

    fn llm_for(&self, model: &str) -> Arc<dyn LlmClient> {
        self.models
            .get(model)
            .cloned()
            .unwrap_or_else(|| self.default_llm.clone())
    }

    fn system_prompt(&self, agent: &AgentConfig) -> String {
        if agent.tools.is_empty() {
            return agent.instructions.clone();
        }
        format!(
            "{}\n\n## Available tools\n{}\n\nTo call a tool, reply with ONLY a JSON object matching this schema:\n{}\n\nYou will receive the tool output as an observation. When you are done, reply with your final answer as plain text, without JSON.",
            agent.instructions,
            self.executor.registry().schema_json_for(&agent.tools),
            tool_call_schema_json()
        )
    }
}

#[async_trait]
impl AgentRunner for LlmAgentRunner {
    async fn run(
        &self,
        agent: &AgentConfig,
        input: &str,
        ctx: &ToolContext,
    ) -> Result<Box<dyn AgentOutput>, AgentError> {
        let llm = self.llm_for(&agent.model);
        let mut messages = vec![Message::system(self.system_prompt(agent)), Message::user(input)];
        let mut tool_calls = 0usize;

        for step in 0..=self.max_tool_steps {
            tracing::info!(agent = %agent.name, model = %agent.model, step, "agent step");
            let reply = llm.complete(&messages).await.map_err(AgentError::LlmError)?;

            // 无工具的 Agent 不做解析，回复即最终结果
            let call = if agent.tools.is_empty() {
                None
            } else {
                parse_tool_call(&reply)
            };
            let Some(call) = call else {
                tracing::info!(agent = %agent.name, tool_calls, "agent finished");
                return Ok(Box::new(RunOutput {
                    agent: agent.name.clone(),
                    final_output: Some(reply),
                }));
            };
            if step == self.max_tool_steps {
                break;
            }

            messages.push(Message::assistant(reply));
            let observation = if agent.has_tool(&call.tool) {
                tool_calls += 1;
                match self.executor.execute(&call.tool, call.args, ctx).await {
                    Ok(out) => out,
                    Err(e) => format!("Tool error: {e}"),
                }
            } else {
                tracing::warn!(agent = %agent.name, tool = %call.tool, "tool not granted");
                format!(
                    "Tool `{}` is not available to you. Available tools: {}.",
                    call.tool,
                    agent.tools.join(", ")
                )
            };
            messages.push(Message::user(format!(
                "Observation from {}:\n{}",
                call.tool, observation
            )));
        }

        Err(AgentError::StepLimit {
            agent: agent.name.clone(),
            limit: self.max_tool_steps,
        })
    }
}
