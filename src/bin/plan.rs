//! Wayfarer 无头模式：对一条请求跑一次 Planner → Reviewer，结果打印到 stdout
//!
//! 用法：wayfarer-plan "3 days in Lisbon, mid-range budget" [config.toml]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use wayfarer::{
    config::load_config_or_default,
    core::build_orchestrator,
    observability,
    tools::{EventLogger, ToolContext, ToolEvent},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_stderr();

    let mut args = std::env::args().skip(1);
    let prompt = args
        .next()
        .context("usage: wayfarer-plan \"<travel request>\" [config.toml]")?;
    let cfg = load_config_or_default(args.next().map(PathBuf::from));
    let orchestrator = build_orchestrator(&cfg);

    let events = EventLogger::new();
    let _guard = events.install(Arc::new(|ev: &ToolEvent| -> Result<(), String> {
        let line = serde_json::to_string(ev).map_err(|e| e.to_string())?;
        tracing::info!(target: "wayfarer::tool_event", "{}", line);
        Ok(())
    }));
    let ctx = ToolContext::new(events.clone()).with_request_id(uuid::Uuid::new_v4().to_string());

    let result = orchestrator
        .run(&prompt, &ctx)
        .await
        .context("Pipeline failed")?;

    if let Some(delta) = &result.delta_list {
        println!("## Changes Made (Delta List)\n\n{}\n", delta);
    }
    println!("## Validated Itinerary\n\n{}", result.itinerary);
    Ok(())
}
