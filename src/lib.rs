//! Wayfarer - Planner → Reviewer 旅行行程流水线
//!
//! 模块划分：
//! - **agents**: Agent 配置、指令文本、执行边界（AgentRunner）与基于 LLM 的工具调用循环
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、UI 状态投影、运行时命令循环
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: 日志初始化
//! - **pipeline**: Planner → Reviewer 编排与 Reviewer 输出切分
//! - **session**: 会话历史、工具活动面板、请求生命周期
//! - **tools**: 工具注册与执行器、事件上报、脱敏、internet_search
//! - **ui**: Ratatui TUI 界面

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod pipeline;
pub mod session;
pub mod tools;
pub mod ui;
