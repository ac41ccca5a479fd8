//! # 着陆腿模型
//!
//! 一条腿 = 测距传感器 + 直线执行器 + 着地锁。
//!
//! 每个快周期分两步使用：
//! 1. [`Leg::measure`] 更新对地距离
//! 2. 控制器汇总全部腿的最大/最小距离后，调用 [`Leg::adjust_target`] 驱动执行器

use leveler_hal::{DistanceSensor, GroundLock, LinearActuator, ScanResult, TargetKind};
use tracing::{debug, trace, warn};

use crate::config::LegTuning;
use crate::mode::LegPreference;

pub type BoxedSensor = Box<dyn DistanceSensor + Send>;
pub type BoxedActuator = Box<dyn LinearActuator + Send>;
pub type BoxedLock = Box<dyn GroundLock + Send>;

/// 单条着陆腿
pub struct Leg {
    name: String,
    sensor: BoxedSensor,
    actuator: BoxedActuator,
    lock: BoxedLock,
    tuning: LegTuning,

    /// 最近一次测得的对地距离，范围 `[0, max_range]`
    last_distance: f64,
    /// 执行器目标位置，范围 `[min_travel, max_travel]`
    computed_target: f64,
    /// 射线命中平台自身（传感器被遮挡）
    interference: bool,
    enabled: bool,
}

impl Leg {
    pub fn new(
        name: impl Into<String>,
        sensor: BoxedSensor,
        actuator: BoxedActuator,
        lock: BoxedLock,
        tuning: LegTuning,
    ) -> Self {
        let computed_target = clamp_travel(
            actuator.position(),
            actuator.min_travel(),
            actuator.max_travel(),
        );
        Self {
            name: name.into(),
            sensor,
            actuator,
            lock,
            tuning,
            last_distance: tuning.max_range,
            computed_target,
            interference: false,
            enabled: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_distance(&self) -> f64 {
        self.last_distance
    }

    pub fn computed_target(&self) -> f64 {
        self.computed_target
    }

    pub fn has_interference(&self) -> bool {
        self.interference
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn actuator_position(&self) -> f64 {
        self.actuator.position()
    }

    /// 执行器行程范围
    pub fn travel_range(&self) -> f64 {
        self.actuator.travel_range()
    }

    /// 测量对地距离
    ///
    /// 传感器暂时不能扫描时保留上一次的距离，返回 `false`。
    pub fn measure(&mut self) -> bool {
        let range = self.tuning.max_range;
        if !self.sensor.can_scan(range) {
            trace!(leg = %self.name, "sensor not ready, keeping last distance");
            return false;
        }

        let result = self.sensor.scan(range);
        let (distance, interference) = self.classify(result);

        if interference && !self.interference {
            warn!(leg = %self.name, "sensor ray hit own structure, reading ignored");
        }
        self.interference = interference;
        self.last_distance = distance;
        debug!(leg = %self.name, distance, "measured ground distance");
        true
    }

    /// 扫描结果 -> (距离, 是否自身遮挡)
    fn classify(&self, result: ScanResult) -> (f64, bool) {
        let max_range = self.tuning.max_range;
        let detection = match result {
            ScanResult::NoHit => return (max_range, false),
            ScanResult::Hit(detection) => detection,
        };

        let hit_itself = detection.body == self.sensor.body()
            || detection.body == self.actuator.body()
            || detection.body == self.lock.body();
        if hit_itself {
            // 遮挡时报告最大距离，避免被当成“离地很近”
            return (max_range, true);
        }

        match (detection.kind, detection.hit_position) {
            (TargetKind::Terrain | TargetKind::Structure, Some(hit)) => {
                let distance = nalgebra::distance(&hit, &self.sensor.position());
                (distance.max(0.0).min(max_range), false)
            },
            _ => (max_range, false),
        }
    }

    /// 根据全体腿的最大/最小距离计算目标位置并驱动执行器
    ///
    /// 返回本次下发的速度（0 表示保持）。
    ///
    /// 执行器只被允许在目标附近宽度为 `tolerance` 的限位带内运动，
    /// 到达后自然停止，不会越过目标后来回振荡。
    pub fn adjust_target(
        &mut self,
        fleet_max: f64,
        fleet_min: f64,
        preference: LegPreference,
    ) -> f64 {
        let min_travel = self.actuator.min_travel();
        let max_travel = self.actuator.max_travel();

        let target = match preference {
            // 离地最远的腿保持全伸出，其余腿按高度差收回
            LegPreference::PreferLongLegs => {
                let offset = self.last_distance - fleet_max;
                clamp_travel(max_travel + offset, min_travel, max_travel)
            },
            // 离地最近的腿保持全收回，其余腿按高度差伸出
            LegPreference::PreferShortLegs => {
                let offset = self.last_distance - fleet_min;
                clamp_travel(min_travel + offset, min_travel, max_travel)
            },
        };
        self.computed_target = target;

        let tol = self.tuning.tolerance;
        let speed = self.tuning.speed;
        let position = self.actuator.position();

        let velocity = if position > target + tol {
            self.actuator.set_limits(target, target + tol);
            -speed
        } else if position < target - tol {
            self.actuator.set_limits(target - tol, target);
            speed
        } else {
            0.0
        };
        self.actuator.set_velocity(velocity);

        trace!(leg = %self.name, target, position, velocity, "actuator drive");
        velocity
    }

    /// 全行程伸出（不调平）
    pub fn extend(&mut self) {
        self.open_full_travel();
        self.actuator.set_velocity(self.tuning.speed);
    }

    /// 全行程收回（不调平）
    pub fn retract(&mut self) {
        self.open_full_travel();
        self.actuator.set_velocity(-self.tuning.speed);
    }

    fn open_full_travel(&mut self) {
        let min_travel = self.actuator.min_travel();
        let max_travel = self.actuator.max_travel();
        self.actuator.set_limits(min_travel, max_travel);
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn arm_auto_lock(&mut self) {
        self.lock.set_auto_lock(true);
    }

    /// 解锁
    ///
    /// 只给锁通电，传感器和执行器保持原状态，活塞不动。
    pub fn unlock(&mut self) {
        self.lock.set_powered(true);
        self.lock.unlock();
    }

    pub fn enable(&mut self) {
        self.sensor.set_scanning(true);
        self.sensor.set_powered(true);
        self.actuator.set_powered(true);
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.sensor.set_scanning(false);
        self.sensor.set_powered(false);
        self.actuator.set_powered(false);
        self.enabled = false;
    }
}

impl std::fmt::Debug for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leg")
            .field("name", &self.name)
            .field("last_distance", &self.last_distance)
            .field("computed_target", &self.computed_target)
            .field("interference", &self.interference)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// 钳位到行程内（行程配置异常时不 panic）
fn clamp_travel(value: f64, min_travel: f64, max_travel: f64) -> f64 {
    value.min(max_travel).max(min_travel)
}
