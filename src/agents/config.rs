//! Agent 定义：名称、模型、指令、工具授权列表（纯数据，启动时构建一次）

use crate::agents::prompts::{PLANNER_INSTRUCTIONS, REVIEWER_INSTRUCTIONS};
use crate::config::AgentsSection;
use crate::tools::search::SEARCH_TOOL_NAME;

pub const PLANNER_NAME: &str = "Planner Agent";
pub const REVIEWER_NAME: &str = "Reviewer Agent";

/// 一个 Agent 的声明式配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub name: String,
    pub model: String,
    pub instructions: String,
    /// 允许调用的工具名（有序）
    pub tools: Vec<String>,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.push(tool.into());
        self
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }

    /// Planner：不授予任何工具，仅凭模型自身知识出行程
    pub fn planner(model: impl Into<String>) -> Self {
        Self::new(PLANNER_NAME, model, PLANNER_INSTRUCTIONS.trim())
    }

    /// Reviewer：授予 internet_search 做事实核查
    pub fn reviewer(model: impl Into<String>) -> Self {
        Self::new(REVIEWER_NAME, model, REVIEWER_INSTRUCTIONS.trim()).with_tool(SEARCH_TOOL_NAME)
    }
}

/// 流水线使用的两个 Agent
#[derive(Debug, Clone)]
pub struct AgentSet {
    pub planner: AgentConfig,
    pub reviewer: AgentConfig,
}

impl AgentSet {
    pub fn from_config(cfg: &AgentsSection) -> Self {
        Self {
            planner: AgentConfig::planner(cfg.planner_model.clone()),
            reviewer: AgentConfig::reviewer(cfg.reviewer_model.clone()),
        }
    }
}
