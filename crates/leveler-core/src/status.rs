//! 状态报告与显示
//!
//! 控制器每个快周期生成一份 [`StatusReport`]，交给所有 [`DisplaySink`] 渲染。

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::mode::{LegPreference, Mode};

/// 显示屏标题
pub const PANEL_TITLE: &str = "LANDING GEAR BALANCER";

/// 字体颜色提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontColor {
    #[default]
    Normal,
    /// 地面过于不平
    Warning,
}

/// 单个快周期的状态快照
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub mode: Mode,
    pub preference: LegPreference,
    /// 着陆腿数量
    pub active_legs: usize,
    /// 地面不平度（最大距离 - 最小距离），保留两位小数
    pub unevenness: f64,
    /// 不平度超出腿部行程可补偿的范围
    pub excessive: bool,
    /// 传感器被遮挡的腿
    pub obstructed: Vec<String>,
}

impl StatusReport {
    pub fn font_color(&self) -> FontColor {
        if self.excessive {
            FontColor::Warning
        } else {
            FontColor::Normal
        }
    }
}

/// 四舍五入到两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", PANEL_TITLE)?;
        write!(f, "\n----------------------")?;
        write!(f, "\n{}", self.mode.label())?;
        write!(f, "\n{}", self.preference.label())?;
        write!(f, "\nNb active kits: {}", self.active_legs)?;
        write!(f, "\nGnd unevenness:{:.2}", self.unevenness)?;
        for name in &self.obstructed {
            write!(f, "\nObstructed camera on\n{}", name)?;
        }
        Ok(())
    }
}

/// 状态显示输出
pub trait DisplaySink {
    /// 控制器构造时调用一次（文本模式、等宽字体、默认颜色）
    fn prepare(&mut self) {}

    fn render(&mut self, report: &StatusReport);
}

/// 共享的显示输出：控制器持有一份，调用方保留另一份读取
impl<S: DisplaySink> DisplaySink for Arc<Mutex<S>> {
    fn prepare(&mut self) {
        self.lock().prepare();
    }

    fn render(&mut self, report: &StatusReport) {
        self.lock().render(report);
    }
}

/// 只保存最近一帧的显示输出（测试用）
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    prepared: bool,
    frames: usize,
    last: Option<StatusReport>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// 已渲染帧数
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn last(&self) -> Option<&StatusReport> {
        self.last.as_ref()
    }

    /// 最近一帧的文本
    pub fn text(&self) -> Option<String> {
        self.last.as_ref().map(ToString::to_string)
    }
}

impl DisplaySink for MemorySink {
    fn prepare(&mut self) {
        self.prepared = true;
    }

    fn render(&mut self, report: &StatusReport) {
        self.frames += 1;
        self.last = Some(report.clone());
    }
}
