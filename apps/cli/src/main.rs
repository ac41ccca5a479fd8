//! # Leveler CLI
//!
//! 着陆平台调平控制器的命令行仿真器。
//!
//! ```bash
//! # 默认场景：四条腿，平台匀速下降
//! leveler-cli run
//! on_shortlegs
//! retract
//!
//! # 脚本驱动，快进运行
//! leveler-cli run --config sim.toml --script landing.json --fast-forward
//!
//! # 查看/校验配置
//! leveler-cli config show
//! leveler-cli config check --config sim.toml
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod panel;
mod script;
mod session;
mod sim;

use commands::{ConfigCommand, RunCommand};

/// Leveler CLI - 着陆平台调平仿真
#[derive(Parser, Debug)]
#[command(name = "leveler-cli")]
#[command(about = "Simulator for the landing platform leveling controller", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行仿真
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 留给状态面板）
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("leveler_cli=info,leveler_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => args.execute().await,
        Commands::Config(cmd) => cmd.execute(),
    }
}
