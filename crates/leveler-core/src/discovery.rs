//! 着陆腿发现
//!
//! 按组名 `{kit_prefix}1`、`{kit_prefix}2`…… 依次查找组件组，
//! 每组必须恰好包含一个传感器、一个执行器、一个锁。
//! 组名必须连续：遇到第一个缺失或配置错误的组即停止。
//!
//! 显示输出按名称挑选：名称中包含 `display_name` 的都会被使用。

use tracing::{debug, info, warn};

use crate::config::LevelerConfig;
use crate::error::DiscoveryError;
use crate::fleet::BoxedDisplay;
use crate::leg::{BoxedActuator, BoxedLock, BoxedSensor, Leg};

/// 一个命名组内的全部组件
#[derive(Default)]
pub struct KitGroup {
    pub sensors: Vec<BoxedSensor>,
    pub actuators: Vec<BoxedActuator>,
    pub locks: Vec<BoxedLock>,
}

impl KitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensor(mut self, sensor: BoxedSensor) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn with_actuator(mut self, actuator: BoxedActuator) -> Self {
        self.actuators.push(actuator);
        self
    }

    pub fn with_lock(mut self, lock: BoxedLock) -> Self {
        self.locks.push(lock);
        self
    }

    /// 校验组件数量并组装成 [`Leg`]
    pub fn into_leg(mut self, name: &str, config: &LevelerConfig) -> Result<Leg, DiscoveryError> {
        let counts = (self.sensors.len(), self.actuators.len(), self.locks.len());
        match (self.sensors.pop(), self.actuators.pop(), self.locks.pop()) {
            (Some(sensor), Some(actuator), Some(lock)) if counts == (1, 1, 1) => {
                Ok(Leg::new(name, sensor, actuator, lock, config.leg))
            },
            _ => Err(DiscoveryError::InvalidSetup {
                name: name.to_string(),
                sensors: counts.0,
                actuators: counts.1,
                locks: counts.2,
            }),
        }
    }
}

impl std::fmt::Debug for KitGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KitGroup")
            .field("sensors", &self.sensors.len())
            .field("actuators", &self.actuators.len())
            .field("locks", &self.locks.len())
            .finish()
    }
}

/// 发现结果
#[derive(Debug)]
pub struct Discovery {
    /// 按编号顺序发现的腿
    pub legs: Vec<Leg>,
    /// 停止原因（查满 `max_kits` 时为 None）
    pub stopped_at: Option<DiscoveryError>,
}

/// 依次查找组件组，直到第一个缺失/无效的组
pub fn discover_legs<F>(config: &LevelerConfig, mut lookup: F) -> Discovery
where
    F: FnMut(&str) -> Option<KitGroup>,
{
    let mut legs = Vec::new();
    let mut stopped_at = None;

    for index in 1..=config.max_kits {
        let name = config.kit_name(index);
        let Some(group) = lookup(&name) else {
            debug!(%name, "group not found, stopping discovery");
            stopped_at = Some(DiscoveryError::MissingGroup(name));
            break;
        };

        match group.into_leg(&name, config) {
            Ok(leg) => {
                debug!(%name, "landing kit found");
                legs.push(leg);
            },
            Err(err) => {
                warn!(%err, "invalid landing kit, stopping discovery");
                stopped_at = Some(err);
                break;
            },
        }
    }

    info!(kits = legs.len(), "discovery finished");
    Discovery { legs, stopped_at }
}

/// 挑选名称包含 `config.display_name` 的显示输出
pub fn select_displays<I>(config: &LevelerConfig, named: I) -> Vec<BoxedDisplay>
where
    I: IntoIterator<Item = (String, BoxedDisplay)>,
{
    let displays: Vec<BoxedDisplay> = named
        .into_iter()
        .filter_map(|(name, display)| {
            if name.contains(&config.display_name) {
                debug!(%name, "status display found");
                Some(display)
            } else {
                None
            }
        })
        .collect();

    if displays.is_empty() {
        warn!(display_name = %config.display_name, "no status display found");
    }
    displays
}
