//! 仿真场景
//!
//! 用模拟硬件搭建一个着陆平台：每条腿的对地距离、执行器行程、初始伸出量，
//! 以及平台的下降速度。腿尖（对地距离 - 伸出量）触地后平台停止下降，
//! 着地锁在已武装时自动锁住。
//!
//! ```toml
//! descent_rate = 1.0
//!
//! # 平台上的显示屏，名称包含 controller.display_name 的会显示状态
//! panels = ["LGB_LCD"]
//!
//! [controller]
//! turnoff_duration = 3
//!
//! [[legs]]
//! ground = 30.0
//! max_travel = 5.0
//!
//! [[legs]]
//! ground = 32.0
//! max_travel = 5.0
//! obstructed = true
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use leveler_core::hal::mock::{ScriptedActuator, ScriptedLock, ScriptedSensor, SensorReply};
use leveler_core::hal::{BodyId, GroundLock, LinearActuator};
use leveler_core::{KitGroup, LevelerConfig};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 仿真配置文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// 平台下降速度（距离单位/秒），0 表示悬停
    pub descent_rate: f64,

    /// 平台上的显示屏名称（终端面板）
    pub panels: Vec<String>,

    /// 控制器配置
    pub controller: LevelerConfig,

    /// 着陆腿，按顺序命名为 `{kit_prefix}1`、`{kit_prefix}2`……
    pub legs: Vec<SimLegConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let leg = |ground| SimLegConfig {
            ground,
            max_travel: 5.0,
            ..SimLegConfig::default()
        };
        let controller = LevelerConfig::default();
        Self {
            descent_rate: 1.0,
            panels: vec![controller.display_name.clone()],
            controller,
            legs: vec![leg(30.0), leg(32.0), leg(33.5), leg(31.0)],
        }
    }
}

/// 单腿仿真参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimLegConfig {
    /// 初始对地距离
    pub ground: f64,
    pub min_travel: f64,
    pub max_travel: f64,
    /// 初始伸出量（默认完全收回）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    /// 传感器被平台自身遮挡
    pub obstructed: bool,
}

impl Default for SimLegConfig {
    fn default() -> Self {
        Self {
            ground: 10.0,
            min_travel: 0.0,
            max_travel: 10.0,
            start: None,
            obstructed: false,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse simulation config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.controller.validate()?;
        if !(self.descent_rate.is_finite() && self.descent_rate >= 0.0) {
            bail!("descent_rate must be non-negative, got {}", self.descent_rate);
        }
        if self.legs.len() > self.controller.max_kits {
            bail!(
                "{} legs configured but max_kits is {}",
                self.legs.len(),
                self.controller.max_kits
            );
        }
        for (i, leg) in self.legs.iter().enumerate() {
            let travel_ok = leg.min_travel.is_finite()
                && leg.max_travel.is_finite()
                && leg.min_travel < leg.max_travel;
            if !travel_ok {
                bail!(
                    "legs[{}]: min_travel {} must be below max_travel {}",
                    i,
                    leg.min_travel,
                    leg.max_travel
                );
            }
            if !(leg.ground.is_finite() && leg.ground >= 0.0) {
                bail!("legs[{}]: ground must be non-negative, got {}", i, leg.ground);
            }
        }
        Ok(())
    }
}

/// 一条仿真腿：保留模拟组件的句柄
#[derive(Debug)]
pub struct SimLeg {
    name: String,
    ground: f64,
    obstructed: bool,
    sensor: ScriptedSensor,
    actuator: ScriptedActuator,
    lock: ScriptedLock,
}

impl SimLeg {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ground(&self) -> f64 {
        self.ground
    }

    pub fn position(&self) -> f64 {
        self.actuator.position()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// 腿尖离地高度
    pub fn clearance(&self) -> f64 {
        self.ground - self.actuator.position()
    }

    fn refresh_sensor(&self) {
        let reply = if self.obstructed {
            SensorReply::SelfHit
        } else {
            SensorReply::Ground {
                distance: self.ground,
            }
        };
        self.sensor.set_reply(reply);
    }

    fn refresh_contact(&self) {
        if self.clearance() <= 0.0 {
            self.lock.touch_down();
        } else {
            self.lock.lift_off();
        }
    }
}

/// 仿真平台
#[derive(Debug)]
pub struct Simulation {
    legs: Vec<SimLeg>,
    descent_rate: f64,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Self {
        let legs = config
            .legs
            .iter()
            .enumerate()
            .map(|(i, leg)| {
                let index = i + 1;
                let body = BodyId(index as u64);
                let actuator = ScriptedActuator::new(body, leg.min_travel, leg.max_travel)
                    .with_position(leg.start.unwrap_or(leg.min_travel));
                let sim = SimLeg {
                    name: config.controller.kit_name(index),
                    ground: leg.ground,
                    obstructed: leg.obstructed,
                    sensor: ScriptedSensor::new(body, Point3::new(i as f64, 0.0, leg.ground)),
                    actuator,
                    lock: ScriptedLock::new(body),
                };
                sim.refresh_sensor();
                sim
            })
            .collect();

        Self {
            legs,
            descent_rate: config.descent_rate,
        }
    }

    pub fn legs(&self) -> &[SimLeg] {
        &self.legs
    }

    /// 任一腿尖已触地
    pub fn is_landed(&self) -> bool {
        self.legs.iter().any(|leg| leg.clearance() <= 0.0)
    }

    /// 按组名导出组件组，供控制器发现
    pub fn kit_groups(&self) -> HashMap<String, KitGroup> {
        self.legs
            .iter()
            .map(|leg| {
                let group = KitGroup::new()
                    .with_sensor(Box::new(leg.sensor.clone()))
                    .with_actuator(Box::new(leg.actuator.clone()))
                    .with_lock(Box::new(leg.lock.clone()));
                (leg.name.clone(), group)
            })
            .collect()
    }

    /// 推进 `dt` 秒：执行器运动、平台下降、触地检测
    pub fn step(&mut self, dt: f64) {
        for leg in &self.legs {
            leg.actuator.step(dt);
        }

        if !self.is_landed() && self.descent_rate > 0.0 {
            let drop = self.descent_rate * dt;
            for leg in &mut self.legs {
                leg.ground = (leg.ground - drop).max(0.0);
            }
            if self.is_landed() {
                info!("platform touched down");
            }
        }

        for leg in &self.legs {
            leg.refresh_sensor();
            leg.refresh_contact();
        }
    }

    /// 修改一条腿下方的地面距离
    pub fn set_ground(&mut self, name: &str, distance: f64) -> Result<()> {
        if !(distance.is_finite() && distance >= 0.0) {
            bail!("Ground distance must be non-negative, got {}", distance);
        }
        let leg = self.leg_mut(name)?;
        leg.ground = distance;
        leg.refresh_sensor();
        leg.refresh_contact();
        debug!(leg = name, distance, "ground distance changed");
        Ok(())
    }

    /// 遮挡/清除一条腿的传感器
    pub fn set_obstructed(&mut self, name: &str, obstructed: bool) -> Result<()> {
        let leg = self.leg_mut(name)?;
        leg.obstructed = obstructed;
        leg.refresh_sensor();
        Ok(())
    }

    fn leg_mut(&mut self, name: &str) -> Result<&mut SimLeg> {
        self.legs
            .iter_mut()
            .find(|leg| leg.name == name)
            .with_context(|| format!("Unknown leg: {}", name))
    }
}
