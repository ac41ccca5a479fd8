//! 仿真会话与调度
//!
//! 每一帧的顺序：
//! 1. 脚本步骤 / 操作员命令
//! 2. 仿真平台推进一个快周期
//! 3. 控制器快周期
//! 4. 每 `slow_every` 帧一次控制器慢周期
//!
//! 实时模式按快周期节拍运行并读取标准输入；快进模式不等待，直接连续推进。

use std::fmt;
use std::io::BufRead;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use leveler_core::{BoxedDisplay, DiscoveryError, FleetController, discover_legs};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::script::ScriptRunner;
use crate::sim::{SimConfig, Simulation};

/// 会话停止条件
#[derive(Debug, Clone, Copy, Default)]
pub struct StopAfter {
    /// 最多运行的快周期数
    pub max_ticks: Option<u64>,
    /// 脚本执行完即停止
    pub script_end: bool,
}

/// 一次仿真运行
pub struct Session {
    fleet: FleetController,
    sim: Simulation,
    script: Option<ScriptRunner>,
    fast_period: Duration,
    slow_every: u64,
    ticks: u64,
}

impl Session {
    /// 搭建仿真平台，发现着陆腿并创建控制器
    pub fn new(config: &SimConfig, displays: Vec<BoxedDisplay>) -> Self {
        let sim = Simulation::new(config);
        let mut groups = sim.kit_groups();
        let discovery = discover_legs(&config.controller, |name| groups.remove(name));

        match &discovery.stopped_at {
            Some(DiscoveryError::MissingGroup(name)) => debug!(%name, "discovery stopped"),
            Some(err) => warn!(%err, "discovery stopped early"),
            None => {},
        }
        if discovery.legs.is_empty() {
            warn!("no landing kits found, controller will only refresh displays");
        }

        let cadence = &config.controller.cadence;
        let ratio = cadence.slow_period().as_secs_f64() / cadence.fast_period().as_secs_f64();
        let slow_every = ratio.round().max(1.0) as u64;

        Self {
            fleet: FleetController::new(&config.controller, discovery.legs, displays),
            sim,
            script: None,
            fast_period: cadence.fast_period(),
            slow_every,
            ticks: 0,
        }
    }

    pub fn with_script(mut self, script: ScriptRunner) -> Self {
        self.script = Some(script);
        self
    }

    pub fn fleet(&self) -> &FleetController {
        &self.fleet
    }

    #[cfg(test)]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// 已运行的快周期数
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// 多少个快周期触发一次慢周期
    #[cfg(test)]
    pub fn slow_every(&self) -> u64 {
        self.slow_every
    }

    /// 操作员输入的一行命令
    pub fn handle_line(&mut self, line: &str) {
        let text = line.trim();
        if text.is_empty() {
            return;
        }
        if self.fleet.handle_text(text).is_none() {
            warn!(text, "unknown command");
        }
    }

    /// 推进一帧
    pub fn frame(&mut self) -> Result<()> {
        if let Some(script) = self.script.as_mut() {
            script.advance(&mut self.fleet, &mut self.sim)?;
        }

        self.sim.step(self.fast_period.as_secs_f64());
        self.fleet.tick_fast();
        self.ticks += 1;

        if self.ticks % self.slow_every == 0 {
            self.fleet.tick_slow();
        }
        Ok(())
    }

    pub fn should_stop(&self, stop: StopAfter) -> bool {
        if stop.max_ticks.is_some_and(|max| self.ticks >= max) {
            return true;
        }
        stop.script_end && self.script.as_ref().is_none_or(ScriptRunner::is_finished)
    }

    /// 不等待地连续推进
    pub fn run_fast_forward(&mut self, stop: StopAfter) -> Result<()> {
        if stop.max_ticks.is_none() && !stop.script_end {
            bail!("Fast-forward needs --ticks or --script to know when to stop");
        }
        while !self.should_stop(stop) {
            self.frame()?;
        }
        info!(ticks = self.ticks, "fast-forward finished");
        Ok(())
    }

    /// 按快周期节拍运行，接受标准输入命令，Ctrl-C 退出
    pub async fn run_realtime(&mut self, stop: StopAfter, read_stdin: bool) -> Result<()> {
        let mut interval = tokio::time::interval(self.fast_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut input = if read_stdin { Some(spawn_stdin_reader()) } else { None };

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        info!(
            fast_period_ms = self.fast_period.as_millis() as u64,
            slow_every = self.slow_every,
            "leveler running, type commands on stdin"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.frame()?;
                    if self.should_stop(stop) {
                        break;
                    }
                },
                line = recv_line(&mut input) => match line {
                    Some(line) => self.handle_line(&line),
                    None => {
                        debug!("stdin closed");
                        input = None;
                    },
                },
                result = &mut ctrl_c => {
                    result.context("Failed to listen for Ctrl-C")?;
                    info!("interrupted");
                    break;
                },
            }
        }
        Ok(())
    }

    /// 运行结束后的摘要
    pub fn summary(&self) -> Summary<'_> {
        Summary { session: self }
    }
}

/// 运行摘要：快周期数、模式、不平度、每条腿的位置/地面/锁定
pub struct Summary<'a> {
    session: &'a Session,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Session { fleet, sim, ticks, .. } = self.session;
        writeln!(f, "ticks: {}", ticks)?;
        writeln!(f, "mode: {}", fleet.mode())?;
        writeln!(f, "unevenness: {:.2}", fleet.unevenness())?;
        for leg in sim.legs() {
            writeln!(
                f,
                "{}: position {:.2}, ground {:.2}, {}",
                leg.name(),
                leg.position(),
                leg.ground(),
                if leg.is_locked() { "locked" } else { "free" }
            )?;
        }
        Ok(())
    }
}

/// 专用输入线程 + 通道，避免阻塞运行时关闭
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                },
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                },
            }
        }
    });
    rx
}

async fn recv_line(input: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match input {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
