//! Wayfarer - 旅行行程规划 TUI
//!
//! 入口：初始化日志（写文件，避免破坏终端画面）、启动运行时与 TUI，并运行主循环。

use anyhow::Context;
use wayfarer::{core::spawn_runtime, observability, ui::run_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_file(observability::LOG_FILE).context("Failed to open log file")?;

    // 运行时：返回命令发送端、状态接收端
    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let (cmd_tx, state_rx) = spawn_runtime(config_path);

    // 启动 TUI 主循环（消费 state，向 cmd_tx 发送用户指令）
    run_app(state_rx, cmd_tx).await.context("App run failed")?;

    Ok(())
}
