//! 错误类型
//!
//! AgentError：Agent 执行边界上的失败（LLM、工具、步数上限）；
//! PipelineError：Planner → Reviewer 流水线中哪一步失败，由会话层转成用户可见的错误消息。
//! 工具层可恢复的失败（缺少凭据、搜索服务出错）不走这里，而是作为工具输出字符串返回。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("{agent} exceeded {limit} tool steps without a final answer")]
    StepLimit { agent: String, limit: usize },
}

/// 流水线错误：标明失败的阶段
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Planner Agent failed: {0}")]
    Planner(#[source] AgentError),

    #[error("Reviewer Agent failed: {0}")]
    Reviewer(#[source] AgentError),

    /// 流水线内部 panic，已在会话层捕获
    #[error("Pipeline panicked: {0}")]
    Panicked(String),
}
