//! run 命令
//!
//! 运行仿真：按配置搭建平台、发现着陆腿、驱动控制器

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use leveler_core::{BoxedDisplay, select_displays};

use crate::commands::config::resolve_config;
use crate::panel::TerminalPanel;
use crate::script::{Script, ScriptRunner};
use crate::session::{Session, StopAfter};

/// 仿真运行参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 仿真配置文件（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 脚本文件（JSON）
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// 运行的快周期数（默认：脚本结束或 Ctrl-C）
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// 不等待节拍，尽快跑完
    #[arg(long)]
    pub fast_forward: bool,

    /// 不读取标准输入命令
    #[arg(long)]
    pub no_stdin: bool,

    /// 不打印状态面板
    #[arg(long)]
    pub quiet: bool,
}

impl RunCommand {
    pub async fn execute(&self) -> Result<()> {
        let config = resolve_config(self.config.as_deref())?;

        let displays = if self.quiet {
            vec![]
        } else {
            let panels = config.panels.iter().map(|name| {
                let panel: BoxedDisplay = Box::new(TerminalPanel::stdout());
                (name.clone(), panel)
            });
            select_displays(&config.controller, panels)
        };
        let mut session = Session::new(&config, displays);

        if let Some(path) = &self.script {
            let script = Script::load(path)?;
            tracing::info!(name = %script.name, steps = script.steps.len(), "script loaded");
            session = session.with_script(ScriptRunner::new(script));
        }

        let stop = StopAfter {
            max_ticks: self.ticks,
            script_end: self.script.is_some() && self.ticks.is_none(),
        };

        if self.fast_forward {
            session.run_fast_forward(stop)?;
        } else {
            session.run_realtime(stop, !self.no_stdin).await?;
        }

        tracing::info!(ticks = session.ticks(), "simulation stopped");
        println!();
        print!("{}", session.summary());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_creation() {
        let cmd = RunCommand {
            config: None,
            script: Some(PathBuf::from("landing.json")),
            ticks: Some(10),
            fast_forward: true,
            no_stdin: false,
            quiet: true,
        };
        assert_eq!(cmd.ticks, Some(10));
        assert!(cmd.fast_forward);
    }
}
