//! 运行时：组装流水线并在后台任务中消费用户命令
//!
//! 负责：加载配置、按模型名创建 LLM 客户端、注册 internet_search、构建 Orchestrator 与 SessionAdapter，
//! 建立 cmd/state 两通道，后台任务处理 Submit/Reset/Quit 并把 UiState 快照发布给 UI。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::agents::{AgentSet, LlmAgentRunner};
use crate::config::{load_config_or_default, AppConfig};
use crate::core::UiState;
use crate::llm::{create_deepseek_client, LlmClient, MockLlmClient, OpenAiClient};
use crate::pipeline::Orchestrator;
use crate::session::SessionAdapter;
use crate::tools::{SearchTool, ToolExecutor, ToolRegistry};

/// 从 UI 发往运行时的用户命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 提交用户输入，触发一轮 Planner → Reviewer
    Submit(String),
    /// 清空会话（历史、活动面板、错误）
    Reset,
    /// 退出应用
    Quit,
}

/// 根据配置与环境变量为指定模型选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
pub fn create_llm_for_model(cfg: &AppConfig, model: &str) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    // 有 DeepSeek Key 或（配置为 deepseek 且仅有 OpenAI Key 时也走 DeepSeek 兼容端点）
    let use_deepseek = std::env::var("DEEPSEEK_API_KEY").is_ok()
        || (provider == "deepseek" && std::env::var("OPENAI_API_KEY").is_ok());
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "deepseek";

    if use_deepseek {
        let client = create_deepseek_client(Some(model)).with_timeout(cfg.llm.timeouts.request);
        tracing::info!("Using DeepSeek LLM ({})", client.model());
        Arc::new(client)
    } else if use_openai {
        tracing::info!("Using OpenAI LLM ({})", model);
        Arc::new(
            OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                model,
                std::env::var("OPENAI_API_KEY").ok().as_deref(),
            )
            .with_timeout(cfg.llm.timeouts.request),
        )
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient)
    }
}

/// 由配置构建编排器：Reviewer 获得 internet_search，Planner 无工具
pub fn build_orchestrator(cfg: &AppConfig) -> Orchestrator {
    let agents = AgentSet::from_config(&cfg.agents);

    let mut tools = ToolRegistry::new();
    tools.register(SearchTool::from_config(&cfg.tools.search));
    let executor = Arc::new(ToolExecutor::new(tools, cfg.tools.tool_timeout_secs));

    let planner_llm = create_llm_for_model(cfg, &agents.planner.model);
    let mut runner = LlmAgentRunner::new(planner_llm, executor, cfg.agents.max_tool_steps);
    if agents.reviewer.model != agents.planner.model {
        let reviewer_llm = create_llm_for_model(cfg, &agents.reviewer.model);
        runner = runner.with_model(agents.reviewer.model.clone(), reviewer_llm);
    }

    Orchestrator::new(Arc::new(runner), agents)
}

/// 启动运行时：返回命令发送端与状态接收端；后台任务串行处理命令（同一时刻只跑一条流水线）
pub fn spawn_runtime(
    config_path: Option<PathBuf>,
) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    let cfg = load_config_or_default(config_path);
    let orchestrator = Arc::new(build_orchestrator(&cfg));
    spawn_with_orchestrator(orchestrator, cfg.ui.max_tool_events)
}

/// 以给定编排器启动后台任务（测试可注入桩实现）
pub fn spawn_with_orchestrator(
    orchestrator: Arc<Orchestrator>,
    max_tool_events: usize,
) -> (mpsc::UnboundedSender<Command>, watch::Receiver<UiState>) {
    // 两通道：UI -> Core 命令；Core -> UI 状态快照
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(UiState::default());
    let state_tx = Arc::new(state_tx);

    let mut adapter = SessionAdapter::new(orchestrator, max_tool_events).with_publisher(state_tx);

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Submit(input) => {
                    let input = input.trim().to_string();
                    if input.is_empty() {
                        continue;
                    }
                    adapter.handle_request(&input).await;
                }
                Command::Reset => adapter.reset(),
                Command::Quit => break,
            }
        }
        tracing::info!("runtime stopped");
    });

    (cmd_tx, state_rx)
}
