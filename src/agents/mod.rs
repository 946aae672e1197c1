//! Agent 层：声明式配置、指令文本、工具调用识别与执行边界（AgentRunner）

pub mod config;
pub mod prompts;
pub mod runner;
pub mod tool_call;

pub use config::{AgentConfig, AgentSet, PLANNER_NAME, REVIEWER_NAME};
pub use runner::{AgentOutput, AgentRunner, LlmAgentRunner, RunOutput};
pub use tool_call::{parse_tool_call, ToolCall};
