//! # GpsMux CLI
//!
//! 双后端 GPS 调度器的操作工具：
//!
//! ```bash
//! # 持久化后端偏好（覆盖自动检测）
//! gpsmux-cli config set --backend external
//!
//! # 查看此刻选择器会选哪个后端、为什么
//! gpsmux-cli select
//!
//! # 用两个 mock 后端跑一遍完整的 init/start/切换/stop 流程
//! gpsmux-cli demo --cycles 3 --toggle-presence
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::config::ConfigCommand;
use commands::demo::DemoCommand;
use commands::select::SelectCommand;

/// GpsMux CLI - 双后端定位调度工具
#[derive(Parser, Debug)]
#[command(name = "gpsmux-cli")]
#[command(about = "Command-line tool for the dual-backend GPS multiplexer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理（持久化后端偏好）
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 显示当前的后端选择结果
    Select(SelectCommand),

    /// 在 mock 后端上演示完整的会话与热切换流程
    Demo(DemoCommand),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Config(cmd) => cmd.execute(),
        Commands::Select(cmd) => cmd.execute(),
        Commands::Demo(cmd) => cmd.execute(),
    }
}
