//! # Leveler Hardware Abstraction Layer
//!
//! 着陆腿硬件抽象层，每条腿由三种能力组成：
//! - [`DistanceSensor`]：向下测距的传感器
//! - [`LinearActuator`]：可伸缩的直线执行器（活塞）
//! - [`GroundLock`]：着地锁
//!
//! 控制层只通过这些 trait 访问硬件，因此真实硬件绑定和脚本化的模拟实现
//! （`mock` feature）可以互换。

use nalgebra::Point3;

#[cfg(feature = "mock")]
pub mod mock;

/// 物理实体标识
///
/// 组件所安装的刚体（结构）的 ID。测距射线命中的实体若与腿上任一组件的
/// `BodyId` 相同，说明射线打到了平台自身。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub u64);

/// 命中目标分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// 地形（行星表面、小行星）
    Terrain,
    /// 其他结构（大型/小型结构体，例如着陆平台）
    Structure,
    /// 其他无法用于测距的实体
    Other,
}

/// 一次命中的详细信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub kind: TargetKind,
    /// 被命中实体所属的刚体
    pub body: BodyId,
    /// 命中点（世界坐标），部分实体不提供
    pub hit_position: Option<Point3<f64>>,
}

/// 单次扫描结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanResult {
    NoHit,
    Hit(Detection),
}

/// 向下测距传感器
pub trait DistanceSensor {
    fn body(&self) -> BodyId;

    /// 传感器在世界坐标中的位置
    fn position(&self) -> Point3<f64>;

    /// 当前是否可以进行 `range` 距离的扫描（冷却、供电不足时返回 false）
    fn can_scan(&self, range: f64) -> bool;

    /// 执行一次扫描
    fn scan(&mut self, range: f64) -> ScanResult;

    fn set_scanning(&mut self, enabled: bool);

    fn set_powered(&mut self, powered: bool);
}

/// 直线执行器
///
/// 速度控制：执行器以 `velocity` 运动，直到到达 `[min_limit, max_limit]` 的边界后停止。
pub trait LinearActuator {
    fn body(&self) -> BodyId;

    /// 当前伸出位置
    fn position(&self) -> f64;

    /// 行程下限（完全收回）
    fn min_travel(&self) -> f64;

    /// 行程上限（完全伸出）
    fn max_travel(&self) -> f64;

    /// 设置运动限位带
    fn set_limits(&mut self, min_limit: f64, max_limit: f64);

    /// 设置速度（正值伸出，负值收回，0 保持）
    fn set_velocity(&mut self, velocity: f64);

    fn set_powered(&mut self, powered: bool);

    /// 行程范围
    fn travel_range(&self) -> f64 {
        self.max_travel() - self.min_travel()
    }
}

/// 着地锁（磁力板、起落架锁等）
pub trait GroundLock {
    fn body(&self) -> BodyId;

    fn is_locked(&self) -> bool;

    /// 武装自动锁定：接触地面时自动锁住
    fn set_auto_lock(&mut self, armed: bool);

    fn set_powered(&mut self, powered: bool);

    fn unlock(&mut self);
}
