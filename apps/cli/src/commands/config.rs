//! 配置管理命令
//!
//! 未指定 `--config` 时依次查找：
//! 1. `$XDG_CONFIG_HOME/leveler/sim.toml`（各平台的用户配置目录）
//! 2. 内置默认场景

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use leveler_core::{BoxedDisplay, discover_legs, select_displays};
use tracing::debug;

use crate::panel::TerminalPanel;
use crate::sim::{SimConfig, Simulation};

/// 默认配置文件路径
pub fn default_config_file() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("leveler");
    path.push("sim.toml");
    Some(path)
}

/// 加载配置：显式路径 > 用户配置文件 > 内置默认
pub fn resolve_config(explicit: Option<&Path>) -> Result<SimConfig> {
    if let Some(path) = explicit {
        return SimConfig::load(path);
    }

    match default_config_file() {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "loading user config");
            SimConfig::load(&path)
        },
        _ => Ok(SimConfig::default()),
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效的配置（TOML）
    Show {
        /// 配置文件路径
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 校验配置并列出会被发现的着陆腿
    Check {
        /// 配置文件路径
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 打印默认配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Show { config } => Self::show(config.as_deref()),
            ConfigCommand::Check { config } => Self::check(config.as_deref()),
            ConfigCommand::Path => {
                let path = default_config_file().context("Cannot determine config directory")?;
                println!("{}", path.display());
                Ok(())
            },
        }
    }

    fn show(path: Option<&Path>) -> Result<()> {
        let config = resolve_config(path)?;
        let text = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        print!("{}", text);
        Ok(())
    }

    fn check(path: Option<&Path>) -> Result<()> {
        let config = resolve_config(path)?;
        let sim = Simulation::new(&config);
        let mut groups = sim.kit_groups();
        let discovery = discover_legs(&config.controller, |name| groups.remove(name));

        println!("✅ Config OK");
        println!("  landing kits: {}", discovery.legs.len());
        for leg in &discovery.legs {
            println!("    {} (travel {:.2})", leg.name(), leg.travel_range());
        }
        let panels = config.panels.iter().map(|name| {
            let panel: BoxedDisplay = Box::new(TerminalPanel::new(std::io::sink(), false));
            (name.clone(), panel)
        });
        let displays = select_displays(&config.controller, panels);
        println!(
            "  status displays: {} (matching {:?})",
            displays.len(),
            config.controller.display_name
        );
        println!(
            "  cadence: fast {} ms, slow {} ms",
            config.controller.cadence.fast_period_ms, config.controller.cadence.slow_period_ms
        );
        println!("  turnoff duration: {} slow ticks", config.controller.turnoff_duration);
        Ok(())
    }
}
