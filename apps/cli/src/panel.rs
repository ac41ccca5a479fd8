//! 终端状态面板
//!
//! 把控制器的状态报告打印到标准输出。内容不变的帧不重复打印。

use std::io::{self, IsTerminal, Write};

use leveler_core::{DisplaySink, FontColor, StatusReport};

const ANSI_WARNING: &str = "\x1b[38;2;255;140;0m";
const ANSI_RESET: &str = "\x1b[0m";

/// 打印到任意 writer 的状态面板
pub struct TerminalPanel<W: Write> {
    out: W,
    color: bool,
    last: Option<String>,
    frames: usize,
}

impl TerminalPanel<io::Stdout> {
    /// 输出到标准输出，仅在终端上启用颜色
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = out.is_terminal();
        Self::new(out, color)
    }
}

impl<W: Write> TerminalPanel<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            last: None,
            frames: 0,
        }
    }

    /// 实际打印的帧数
    #[cfg(test)]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, text: &str, color: FontColor) -> io::Result<()> {
        writeln!(self.out)?;
        match (self.color, color) {
            (true, FontColor::Warning) => writeln!(self.out, "{}{}{}", ANSI_WARNING, text, ANSI_RESET)?,
            _ => writeln!(self.out, "{}", text)?,
        }
        self.out.flush()
    }
}

impl<W: Write> DisplaySink for TerminalPanel<W> {
    fn render(&mut self, report: &StatusReport) {
        let text = report.to_string();
        let keyed = format!("{:?}{}", report.font_color(), text);
        if self.last.as_deref() == Some(keyed.as_str()) {
            return;
        }

        if let Err(e) = self.write_frame(&text, report.font_color()) {
            tracing::warn!(error = %e, "failed to write status panel");
            return;
        }
        self.frames += 1;
        self.last = Some(keyed);
    }
}
