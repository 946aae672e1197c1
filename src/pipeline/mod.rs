//! 流水线层：Planner → Reviewer 编排与 Reviewer 输出切分

pub mod orchestrator;
pub mod review_parser;

pub use orchestrator::{extract_text, Orchestrator, PipelineResult};
pub use review_parser::{parse_review, ReviewSections};
