//! 脚本系统
//!
//! JSON 脚本按快周期推进：命令与地面变化立即执行，`Wait` 消耗快周期。
//!
//! ```json
//! {
//!   "name": "landing",
//!   "description": "turn on, wait, then retract",
//!   "steps": [
//!     { "type": "Command", "text": "on_shortlegs" },
//!     { "type": "Wait", "fast_ticks": 60 },
//!     { "type": "SetGround", "leg": "LGB_kit2", "distance": 12.5 },
//!     { "type": "Command", "text": "retract" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use leveler_core::FleetController;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sim::Simulation;

/// 脚本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// 脚本名称
    #[serde(default)]
    pub name: String,

    /// 脚本描述
    #[serde(default)]
    pub description: String,

    /// 步骤序列
    pub steps: Vec<ScriptStep>,
}

/// 脚本步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptStep {
    /// 操作员命令文本（与标准输入相同的词汇）
    Command { text: String },

    /// 等待若干快周期
    Wait { fast_ticks: u32 },

    /// 修改一条腿下方的地面距离
    SetGround { leg: String, distance: f64 },

    /// 遮挡/清除一条腿的传感器
    Obstruct {
        leg: String,
        #[serde(default = "default_true")]
        obstructed: bool,
    },
}

fn default_true() -> bool {
    true
}

impl Script {
    /// 加载脚本文件
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script file {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse script")
    }
}

/// 脚本执行器：每个快周期调用一次 [`advance`](Self::advance)
#[derive(Debug)]
pub struct ScriptRunner {
    steps: Vec<ScriptStep>,
    cursor: usize,
    waiting: u32,
}

impl ScriptRunner {
    pub fn new(script: Script) -> Self {
        Self {
            steps: script.steps,
            cursor: 0,
            waiting: 0,
        }
    }

    /// 所有步骤已执行完毕
    pub fn is_finished(&self) -> bool {
        self.waiting == 0 && self.cursor >= self.steps.len()
    }

    /// 执行到下一个 `Wait`（或脚本结束）
    pub fn advance(&mut self, fleet: &mut FleetController, sim: &mut Simulation) -> Result<()> {
        if self.waiting > 0 {
            self.waiting -= 1;
            return Ok(());
        }

        while let Some(step) = self.steps.get(self.cursor) {
            self.cursor += 1;
            match step {
                ScriptStep::Command { text } => {
                    if fleet.handle_text(text).is_none() {
                        warn!(text = %text, "script command not recognized");
                    }
                },
                ScriptStep::Wait { fast_ticks } => {
                    if *fast_ticks > 0 {
                        self.waiting = fast_ticks - 1;
                        return Ok(());
                    }
                },
                ScriptStep::SetGround { leg, distance } => {
                    sim.set_ground(leg, *distance)
                        .with_context(|| format!("Script step {} failed", self.cursor))?;
                },
                ScriptStep::Obstruct { leg, obstructed } => {
                    sim.set_obstructed(leg, *obstructed)
                        .with_context(|| format!("Script step {} failed", self.cursor))?;
                },
            }
        }

        if self.cursor == self.steps.len() {
            info!("script finished");
            // 只记录一次
            self.cursor += 1;
        }
        Ok(())
    }
}
