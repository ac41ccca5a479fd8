//! 测试公共设施：脚本化着陆腿组

#![allow(dead_code)]

use leveler_core::hal::BodyId;
use leveler_core::hal::mock::{ScriptedActuator, ScriptedLock, ScriptedSensor, SensorReply};
use leveler_core::{BoxedDisplay, FleetController, Leg, LevelerConfig};
use nalgebra::Point3;

/// 一条模拟腿保留的句柄
pub struct LegHandles {
    pub sensor: ScriptedSensor,
    pub actuator: ScriptedActuator,
    pub lock: ScriptedLock,
}

impl LegHandles {
    pub fn set_ground(&self, distance: f64) {
        self.sensor.set_reply(SensorReply::Ground { distance });
    }
}

/// 构造一条腿：传感器位于 (index, 0, 50)，执行器行程 `[min, max]`
pub fn scripted_leg(
    config: &LevelerConfig,
    index: u64,
    distance: f64,
    travel: (f64, f64),
) -> (Leg, LegHandles) {
    let sensor = ScriptedSensor::new(BodyId(index), Point3::new(index as f64, 0.0, 50.0));
    sensor.set_reply(SensorReply::Ground { distance });
    let actuator = ScriptedActuator::new(BodyId(index), travel.0, travel.1);
    let lock = ScriptedLock::new(BodyId(index));

    let leg = Leg::new(
        config.kit_name(index as usize),
        Box::new(sensor.clone()),
        Box::new(actuator.clone()),
        Box::new(lock.clone()),
        config.leg,
    );
    (
        leg,
        LegHandles {
            sensor,
            actuator,
            lock,
        },
    )
}

/// 按距离列表构造控制器，每条腿行程相同
pub fn scripted_fleet(
    config: &LevelerConfig,
    distances: &[f64],
    travel: (f64, f64),
    displays: Vec<BoxedDisplay>,
) -> (FleetController, Vec<LegHandles>) {
    let (legs, handles): (Vec<_>, Vec<_>) = distances
        .iter()
        .enumerate()
        .map(|(i, distance)| scripted_leg(config, i as u64 + 1, *distance, travel))
        .unzip();
    (FleetController::new(config, legs, displays), handles)
}

/// 推进所有执行器
pub fn step_actuators(handles: &[LegHandles], dt: f64) {
    for h in handles {
        h.actuator.step(dt);
    }
}
