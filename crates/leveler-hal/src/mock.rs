//! 脚本化模拟硬件
//!
//! 每个模拟组件都是一个可克隆的句柄（内部 `Arc<Mutex<..>>`），
//! 组件交给 `Leg` 之后，测试/仿真仍可通过保留的句柄修改传感器回波、
//! 读取执行器指令、模拟着地。

use std::sync::Arc;

use nalgebra::{Point3, Vector3};
use parking_lot::Mutex;
use tracing::trace;

use crate::{BodyId, Detection, DistanceSensor, GroundLock, LinearActuator, ScanResult, TargetKind};

// ==================== 传感器 ====================

/// 传感器的脚本化回波
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReply {
    /// 无命中
    Nothing,
    /// 在正下方 `distance` 处命中地形
    Ground { distance: f64 },
    /// 在正下方 `distance` 处命中另一个结构体
    Structure { distance: f64, body: BodyId },
    /// 射线命中平台自身（传感器被遮挡）
    SelfHit,
    /// 命中无法测距的实体
    Other,
}

#[derive(Debug)]
struct SensorState {
    body: BodyId,
    position: Point3<f64>,
    reply: SensorReply,
    available: bool,
    scanning: bool,
    powered: bool,
    scans: usize,
}

/// 模拟测距传感器（射线方向 -Z）
#[derive(Debug, Clone)]
pub struct ScriptedSensor {
    state: Arc<Mutex<SensorState>>,
}

impl ScriptedSensor {
    pub fn new(body: BodyId, position: Point3<f64>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SensorState {
                body,
                position,
                reply: SensorReply::Nothing,
                available: true,
                scanning: false,
                powered: false,
                scans: 0,
            })),
        }
    }

    /// 设置后续扫描的回波
    pub fn set_reply(&self, reply: SensorReply) {
        self.state.lock().reply = reply;
    }

    /// 模拟冷却/供电不足（`false` 时 `can_scan` 始终返回 false）
    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    pub fn is_scanning(&self) -> bool {
        self.state.lock().scanning
    }

    pub fn is_powered(&self) -> bool {
        self.state.lock().powered
    }

    /// 已执行的扫描次数
    pub fn scan_count(&self) -> usize {
        self.state.lock().scans
    }
}

impl DistanceSensor for ScriptedSensor {
    fn body(&self) -> BodyId {
        self.state.lock().body
    }

    fn position(&self) -> Point3<f64> {
        self.state.lock().position
    }

    fn can_scan(&self, _range: f64) -> bool {
        let state = self.state.lock();
        state.available && state.scanning && state.powered
    }

    fn scan(&mut self, range: f64) -> ScanResult {
        let mut state = self.state.lock();
        state.scans += 1;

        let below = |distance: f64| state.position - Vector3::z() * distance;
        match state.reply {
            SensorReply::Nothing => ScanResult::NoHit,
            SensorReply::Ground { distance } | SensorReply::Structure { distance, .. }
                if distance > range =>
            {
                ScanResult::NoHit
            },
            SensorReply::Ground { distance } => ScanResult::Hit(Detection {
                kind: TargetKind::Terrain,
                body: BodyId(0),
                hit_position: Some(below(distance)),
            }),
            SensorReply::Structure { distance, body } => ScanResult::Hit(Detection {
                kind: TargetKind::Structure,
                body,
                hit_position: Some(below(distance)),
            }),
            SensorReply::SelfHit => ScanResult::Hit(Detection {
                kind: TargetKind::Structure,
                body: state.body,
                hit_position: Some(below(0.5)),
            }),
            SensorReply::Other => ScanResult::Hit(Detection {
                kind: TargetKind::Other,
                body: BodyId(u64::MAX),
                hit_position: None,
            }),
        }
    }

    fn set_scanning(&mut self, enabled: bool) {
        self.state.lock().scanning = enabled;
    }

    fn set_powered(&mut self, powered: bool) {
        self.state.lock().powered = powered;
    }
}

// ==================== 执行器 ====================

#[derive(Debug)]
struct ActuatorState {
    body: BodyId,
    position: f64,
    min_travel: f64,
    max_travel: f64,
    min_limit: f64,
    max_limit: f64,
    velocity: f64,
    powered: bool,
}

/// 模拟直线执行器
///
/// 调用 [`step`](Self::step) 按当前速度积分位置，位置不会越过限位带。
#[derive(Debug, Clone)]
pub struct ScriptedActuator {
    state: Arc<Mutex<ActuatorState>>,
}

impl ScriptedActuator {
    pub fn new(body: BodyId, min_travel: f64, max_travel: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ActuatorState {
                body,
                position: min_travel,
                min_travel,
                max_travel,
                min_limit: min_travel,
                max_limit: max_travel,
                velocity: 0.0,
                powered: false,
            })),
        }
    }

    /// 设置初始位置（钳位到行程内）
    pub fn with_position(self, position: f64) -> Self {
        self.set_position(position);
        self
    }

    pub fn set_position(&self, position: f64) {
        let mut state = self.state.lock();
        state.position = position.clamp(state.min_travel, state.max_travel);
    }

    pub fn velocity(&self) -> f64 {
        self.state.lock().velocity
    }

    /// 当前限位带 `(min_limit, max_limit)`
    pub fn limits(&self) -> (f64, f64) {
        let state = self.state.lock();
        (state.min_limit, state.max_limit)
    }

    pub fn is_powered(&self) -> bool {
        self.state.lock().powered
    }

    /// 推进 `dt` 秒
    pub fn step(&self, dt: f64) {
        let mut state = self.state.lock();
        if !state.powered || state.velocity == 0.0 {
            return;
        }

        let next = state.position + state.velocity * dt;
        if state.velocity > 0.0 && state.position < state.max_limit {
            state.position = next.min(state.max_limit);
        } else if state.velocity < 0.0 && state.position > state.min_limit {
            state.position = next.max(state.min_limit);
        }
        trace!(position = state.position, velocity = state.velocity, "actuator step");
    }
}

impl LinearActuator for ScriptedActuator {
    fn body(&self) -> BodyId {
        self.state.lock().body
    }

    fn position(&self) -> f64 {
        self.state.lock().position
    }

    fn min_travel(&self) -> f64 {
        self.state.lock().min_travel
    }

    fn max_travel(&self) -> f64 {
        self.state.lock().max_travel
    }

    fn set_limits(&mut self, min_limit: f64, max_limit: f64) {
        let mut state = self.state.lock();
        state.min_limit = min_limit.clamp(state.min_travel, state.max_travel);
        state.max_limit = max_limit.clamp(state.min_travel, state.max_travel);
    }

    fn set_velocity(&mut self, velocity: f64) {
        self.state.lock().velocity = velocity;
    }

    fn set_powered(&mut self, powered: bool) {
        self.state.lock().powered = powered;
    }
}

// ==================== 着地锁 ====================

#[derive(Debug)]
struct LockState {
    body: BodyId,
    locked: bool,
    auto_lock: bool,
    powered: bool,
    in_contact: bool,
    unlocks: usize,
}

/// 模拟着地锁
#[derive(Debug, Clone)]
pub struct ScriptedLock {
    state: Arc<Mutex<LockState>>,
}

impl ScriptedLock {
    pub fn new(body: BodyId) -> Self {
        Self {
            state: Arc::new(Mutex::new(LockState {
                body,
                locked: false,
                auto_lock: false,
                powered: true,
                in_contact: false,
                unlocks: 0,
            })),
        }
    }

    /// 直接设置锁定状态
    pub fn set_locked(&self, locked: bool) {
        self.state.lock().locked = locked;
    }

    /// 模拟接触地面：已武装自动锁定且通电时立即锁住
    pub fn touch_down(&self) {
        let mut state = self.state.lock();
        state.in_contact = true;
        if state.auto_lock && state.powered {
            state.locked = true;
        }
    }

    /// 模拟离开地面
    pub fn lift_off(&self) {
        self.state.lock().in_contact = false;
    }

    pub fn auto_lock(&self) -> bool {
        self.state.lock().auto_lock
    }

    pub fn is_powered(&self) -> bool {
        self.state.lock().powered
    }

    /// 收到的有效解锁次数
    pub fn unlock_count(&self) -> usize {
        self.state.lock().unlocks
    }
}

impl GroundLock for ScriptedLock {
    fn body(&self) -> BodyId {
        self.state.lock().body
    }

    fn is_locked(&self) -> bool {
        self.state.lock().locked
    }

    fn set_auto_lock(&mut self, armed: bool) {
        let mut state = self.state.lock();
        state.auto_lock = armed;
        if armed && state.in_contact && state.powered {
            state.locked = true;
        }
    }

    fn set_powered(&mut self, powered: bool) {
        self.state.lock().powered = powered;
    }

    fn unlock(&mut self) {
        let mut state = self.state.lock();
        // 断电的锁不响应解锁
        if state.powered {
            state.locked = false;
            state.unlocks += 1;
        }
    }
}
