//! 控制器模式定义

use std::fmt;

/// 调平策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegPreference {
    /// 长腿优先：默认全部伸出，地面较高处的腿相对收回
    #[default]
    PreferLongLegs,
    /// 短腿优先：默认全部收回，地面较低处的腿相对伸出
    PreferShortLegs,
}

impl LegPreference {
    /// 显示屏上的标签
    pub fn label(self) -> &'static str {
        match self {
            Self::PreferLongLegs => "Long legs mode",
            Self::PreferShortLegs => "Short legs mode",
        }
    }
}

/// 控制器模式
///
/// 关闭计时器只存在于全局伸出/收回模式中，
/// 因此不会出现“调平中同时又在倒计时关闭”的组合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// 空闲：不测距、不驱动（初始状态）
    #[default]
    Idle,

    /// 调平中：周期性测距并调整执行器，自动锁定已武装
    Active,

    /// 全局伸出，`remaining` 个慢周期后自动关闭
    ExtendingAll { remaining: u32 },

    /// 全局收回，`remaining` 个慢周期后自动关闭
    RetractingAll { remaining: u32 },
}

impl Mode {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// 剩余的关闭计时（没有计时器时为 None）
    pub fn shutdown_timer(self) -> Option<u32> {
        match self {
            Self::ExtendingAll { remaining } | Self::RetractingAll { remaining } => Some(remaining),
            Self::Idle | Self::Active => None,
        }
    }

    /// 显示屏上的标签
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::ExtendingAll { .. } | Self::RetractingAll { .. } => "Global extend/retract",
            Self::Idle => "Disabled",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
            Self::ExtendingAll { remaining } => write!(f, "ExtendingAll({} left)", remaining),
            Self::RetractingAll { remaining } => write!(f, "RetractingAll({} left)", remaining),
        }
    }
}
