//! 核心层：错误类型、UI 状态投影、运行时（命令循环与流水线组装）

pub mod error;
pub mod runtime;
pub mod state;

pub use error::{AgentError, PipelineError};
pub use runtime::{build_orchestrator, create_llm_for_model, spawn_runtime, spawn_with_orchestrator, Command};
pub use state::{AgentPhase, UiState};
