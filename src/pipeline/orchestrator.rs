//! 两阶段编排：Planner 出行程 → Reviewer 核查
//!
//! 每个阶段恰好调用一次执行边界并等待完成；Reviewer 只在 Planner 完成后启动。
//! 结果文本经 extract_text 按固定顺序取出，结果形态不合预期时退回 Display，不会因此失败。

use std::sync::Arc;

use crate::agents::{AgentConfig, AgentOutput, AgentRunner, AgentSet};
use crate::core::{AgentError, PipelineError};
use crate::pipeline::review_parser::parse_review;
use crate::tools::ToolContext;

/// 一轮对话的流水线产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub plan: String,
    pub review: String,
    pub delta_list: Option<String>,
    pub itinerary: String,
}

impl PipelineResult {
    /// 由 Planner / Reviewer 文本派生修订清单与行程
    pub fn from_texts(plan: String, review: String) -> Self {
        let sections = parse_review(&review);
        Self {
            plan,
            review,
            delta_list: sections.delta_list,
            itinerary: sections.itinerary,
        }
    }
}

/// 取结果文本：非空 final_output → 非空 text → Display
pub fn extract_text(output: &dyn AgentOutput) -> String {
    output
        .final_output()
        .filter(|s| !s.is_empty())
        .or_else(|| output.text().filter(|s| !s.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| output.to_string())
}

/// 编排器：持有执行边界与两个 Agent 配置
pub struct Orchestrator {
    runner: Arc<dyn AgentRunner>,
    agents: AgentSet,
}

impl Orchestrator {
    pub fn new(runner: Arc<dyn AgentRunner>, agents: AgentSet) -> Self {
        Self { runner, agents }
    }

    pub fn agents(&self) -> &AgentSet {
        &self.agents
    }

    async fn run_agent(&self, agent: &AgentConfig, input: &str, ctx: &ToolContext) -> Result<String, AgentError> {
        tracing::info!(agent = %agent.name, input_chars = input.chars().count(), "agent run start");
        let output = self.runner.run(agent, input, ctx).await?;
        let text = extract_text(output.as_ref());
        tracing::info!(agent = %agent.name, output_chars = text.chars().count(), "agent run done");
        Ok(text)
    }

    /// 运行 Planner，返回行程草稿
    pub async fn run_planner(&self, user_text: &str, ctx: &ToolContext) -> Result<String, PipelineError> {
        self.run_agent(&self.agents.planner, user_text, ctx)
            .await
            .map_err(PipelineError::Planner)
    }

    /// 运行 Reviewer，以 Planner 的输出为输入
    pub async fn run_reviewer(&self, plan_text: &str, ctx: &ToolContext) -> Result<String, PipelineError> {
        self.run_agent(&self.agents.reviewer, plan_text, ctx)
            .await
            .map_err(PipelineError::Reviewer)
    }

    /// 完整流水线：Planner → Reviewer → 切分
    pub async fn run(&self, user_text: &str, ctx: &ToolContext) -> Result<PipelineResult, PipelineError> {
        let plan = self.run_planner(user_text, ctx).await?;
        let review = self.run_reviewer(&plan, ctx).await?;
        Ok(PipelineResult::from_texts(plan, review))
    }
}
