//! # 着陆腿组控制器
//!
//! 持有全部 [`Leg`] 和显示输出，由外部调度器以两个周期驱动：
//!
//! - **快周期** [`FleetController::tick_fast`]：锁定检查 → 调平（测距 → 汇总 → 调整）→ 刷新显示
//! - **慢周期** [`FleetController::tick_slow`]：关闭计时器倒数
//!
//! 操作员命令通过 [`FleetController::apply`] 在两次周期之间执行，
//! 命令引起的状态转换（包括启用/禁用每条腿）在下一个周期之前完整结束。
//!
//! # 状态机
//!
//! ```text
//!            turn_on                       tick_slow (remaining == 0)
//!   Idle ───────────────▶ Active      ExtendingAll/RetractingAll ───────▶ Idle
//!    ▲                      │
//!    └──── lock engaged ────┘        turn_off: 任意状态 ───────────────▶ Idle
//! ```

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::LevelerConfig;
use crate::leg::Leg;
use crate::mode::{LegPreference, Mode};
use crate::status::{DisplaySink, StatusReport, round2};

pub type BoxedDisplay = Box<dyn DisplaySink + Send>;

/// 着陆腿组控制器
pub struct FleetController {
    legs: Vec<Leg>,
    displays: Vec<BoxedDisplay>,

    mode: Mode,
    preference: LegPreference,

    /// 本周期各腿距离的最大/最小值
    max_distance: f64,
    min_distance: f64,

    /// 允许的最大不平度（第一条腿的执行器行程）
    max_unevenness_allowed: f64,

    /// 全局伸出/收回后的关闭计时（慢周期数）
    turnoff_duration: u32,
}

impl FleetController {
    /// 创建控制器（初始为 Idle）
    ///
    /// 不平度上限取自第一条腿的执行器行程；没有腿时为 0。
    pub fn new(config: &LevelerConfig, legs: Vec<Leg>, mut displays: Vec<BoxedDisplay>) -> Self {
        let max_unevenness_allowed = legs.first().map(Leg::travel_range).unwrap_or(0.0);

        for display in &mut displays {
            display.prepare();
        }

        info!(
            legs = legs.len(),
            displays = displays.len(),
            max_unevenness_allowed,
            "fleet controller created"
        );

        Self {
            legs,
            displays,
            mode: Mode::Idle,
            preference: LegPreference::default(),
            max_distance: 0.0,
            min_distance: 0.0,
            max_unevenness_allowed,
            turnoff_duration: config.turnoff_duration,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn preference(&self) -> LegPreference {
        self.preference
    }

    pub fn shutdown_timer(&self) -> Option<u32> {
        self.mode.shutdown_timer()
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub fn max_unevenness_allowed(&self) -> f64 {
        self.max_unevenness_allowed
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn leg(&self, name: &str) -> Option<&Leg> {
        self.legs.iter().find(|leg| leg.name() == name)
    }

    // ==================== 命令 ====================

    /// 执行一条命令
    pub fn apply(&mut self, command: Command) {
        debug!(%command, "applying command");
        match command {
            Command::TurnOff => self.turn_off(),
            Command::TurnOn(preference) => self.turn_on(preference),
            Command::ExtendAll => self.extend_all(),
            Command::RetractAll => self.retract_all(),
            Command::UnlockAll => self.unlock_all(),
            Command::UnlockThenRetract => {
                self.unlock_all();
                self.retract_all();
            },
            Command::UnlockThenExtend => {
                self.unlock_all();
                self.extend_all();
            },
        }
    }

    /// 解析并执行文本命令，无法识别的命令被忽略
    pub fn handle_text(&mut self, text: &str) -> Option<Command> {
        match text.parse::<Command>() {
            Ok(command) => {
                self.apply(command);
                Some(command)
            },
            Err(err) => {
                debug!(%err, "ignoring command");
                None
            },
        }
    }

    /// 开始调平
    pub fn turn_on(&mut self, preference: LegPreference) {
        self.preference = preference;
        self.transition(Mode::Active);
    }

    /// 关闭（任意状态），取消关闭计时
    pub fn turn_off(&mut self) {
        self.transition(Mode::Idle);
    }

    /// 全部伸出并启动关闭计时
    pub fn extend_all(&mut self) {
        self.transition(Mode::ExtendingAll {
            remaining: self.turnoff_duration,
        });
    }

    /// 全部收回并启动关闭计时
    pub fn retract_all(&mut self) {
        self.transition(Mode::RetractingAll {
            remaining: self.turnoff_duration,
        });
    }

    /// 解锁全部腿（不改变模式）
    pub fn unlock_all(&mut self) {
        for leg in &mut self.legs {
            leg.unlock();
        }
        info!(legs = self.legs.len(), "all locks released");
    }

    /// 唯一的状态转换入口：进入 `next` 并对每条腿执行对应动作
    fn transition(&mut self, next: Mode) {
        let previous = self.mode;
        self.mode = next;

        match next {
            Mode::Idle => {
                for leg in &mut self.legs {
                    leg.disable();
                }
            },
            Mode::Active => {
                for leg in &mut self.legs {
                    leg.enable();
                    leg.arm_auto_lock();
                }
            },
            Mode::ExtendingAll { .. } => {
                for leg in &mut self.legs {
                    leg.enable();
                    leg.extend();
                }
            },
            Mode::RetractingAll { .. } => {
                for leg in &mut self.legs {
                    leg.enable();
                    leg.retract();
                }
            },
        }

        info!(from = %previous, to = %next, preference = ?self.preference, "mode transition");
    }

    // ==================== 周期 ====================

    /// 快周期：锁定检查、调平、刷新显示
    pub fn tick_fast(&mut self) {
        if self.mode.is_active() {
            // 任一腿已锁定说明已经着陆，停止驱动执行器
            let locked = self
                .legs
                .iter()
                .find(|leg| leg.is_locked())
                .map(|leg| leg.name().to_string());
            if let Some(leg) = locked {
                warn!(%leg, "landing lock engaged, leaving active leveling");
                self.transition(Mode::Idle);
            } else {
                self.level();
            }
        }

        self.refresh_displays();
    }

    /// 慢周期：关闭计时器倒数，归零时关闭
    pub fn tick_slow(&mut self) {
        let expired = match &mut self.mode {
            Mode::ExtendingAll { remaining } | Mode::RetractingAll { remaining } => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            },
            Mode::Idle | Mode::Active => false,
        };

        if expired {
            info!("shutdown timer expired");
            self.turn_off();
        }
    }

    /// 调平：先完成全部测距，再用汇总结果调整每条腿
    fn level(&mut self) {
        for leg in &mut self.legs {
            leg.measure();
        }

        let (max_distance, min_distance) = self.aggregate();
        self.max_distance = max_distance;
        self.min_distance = min_distance;

        for leg in &mut self.legs {
            leg.adjust_target(max_distance, min_distance, self.preference);
        }

        debug!(max_distance, min_distance, "leveling cycle complete");
    }

    /// 汇总各腿距离 `(max, min)`，没有腿时为 `(0, 0)`
    fn aggregate(&self) -> (f64, f64) {
        if self.legs.is_empty() {
            return (0.0, 0.0);
        }

        self.legs.iter().map(Leg::last_distance).fold(
            (f64::NEG_INFINITY, f64::INFINITY),
            |(max, min), distance| (max.max(distance), min.min(distance)),
        )
    }

    /// 地面不平度
    pub fn unevenness(&self) -> f64 {
        self.max_distance - self.min_distance
    }

    /// 不平度是否超过允许值（严格大于）
    pub fn check_unevenness(&self) -> bool {
        self.unevenness() > self.max_unevenness_allowed
    }

    // ==================== 状态 ====================

    /// 当前状态快照
    pub fn status(&self) -> StatusReport {
        StatusReport {
            mode: self.mode,
            preference: self.preference,
            active_legs: self.legs.len(),
            unevenness: round2(self.unevenness()),
            excessive: self.check_unevenness(),
            obstructed: self
                .legs
                .iter()
                .filter(|leg| leg.has_interference())
                .map(|leg| leg.name().to_string())
                .collect(),
        }
    }

    fn refresh_displays(&mut self) {
        if self.displays.is_empty() {
            return;
        }

        let report = self.status();
        for display in &mut self.displays {
            display.render(&report);
        }
    }
}

impl std::fmt::Debug for FleetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetController")
            .field("mode", &self.mode)
            .field("preference", &self.preference)
            .field("legs", &self.legs)
            .field("displays", &self.displays.len())
            .field("max_distance", &self.max_distance)
            .field("min_distance", &self.min_distance)
            .finish()
    }
}
