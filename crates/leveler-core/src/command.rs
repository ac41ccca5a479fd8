//! 操作员命令
//!
//! 固定词汇表，文本必须完全匹配。

use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;
use crate::mode::LegPreference;

/// 操作员命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `off`：关闭，不移动执行器
    TurnOff,
    /// `on` / `on_longlegs` / `on_shortlegs`：开始调平
    TurnOn(LegPreference),
    /// `extend`：全部伸出，计时后关闭
    ExtendAll,
    /// `retract`：全部收回，计时后关闭
    RetractAll,
    /// `unlock`：解锁全部，执行器保持不动
    UnlockAll,
    /// `unlock_retract`：先解锁再全部收回
    UnlockThenRetract,
    /// `unlock_extend`：先解锁再全部伸出
    UnlockThenExtend,
}

impl Command {
    /// 全部命令文本
    pub const VOCABULARY: [&'static str; 9] = [
        "off",
        "on",
        "on_longlegs",
        "on_shortlegs",
        "extend",
        "retract",
        "unlock",
        "unlock_retract",
        "unlock_extend",
    ];
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s {
            "off" => Self::TurnOff,
            "on" | "on_longlegs" => Self::TurnOn(LegPreference::PreferLongLegs),
            "on_shortlegs" => Self::TurnOn(LegPreference::PreferShortLegs),
            "extend" => Self::ExtendAll,
            "retract" => Self::RetractAll,
            "unlock" => Self::UnlockAll,
            "unlock_retract" => Self::UnlockThenRetract,
            "unlock_extend" => Self::UnlockThenExtend,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::TurnOff => "off",
            Self::TurnOn(LegPreference::PreferLongLegs) => "on_longlegs",
            Self::TurnOn(LegPreference::PreferShortLegs) => "on_shortlegs",
            Self::ExtendAll => "extend",
            Self::RetractAll => "retract",
            Self::UnlockAll => "unlock",
            Self::UnlockThenRetract => "unlock_retract",
            Self::UnlockThenExtend => "unlock_extend",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!("off".parse::<Command>(), Ok(Command::TurnOff));
        assert_eq!(
            "on".parse::<Command>(),
            Ok(Command::TurnOn(LegPreference::PreferLongLegs))
        );
        assert_eq!(
            "on_longlegs".parse::<Command>(),
            Ok(Command::TurnOn(LegPreference::PreferLongLegs))
        );
        assert_eq!(
            "on_shortlegs".parse::<Command>(),
            Ok(Command::TurnOn(LegPreference::PreferShortLegs))
        );
        assert_eq!("extend".parse::<Command>(), Ok(Command::ExtendAll));
        assert_eq!("retract".parse::<Command>(), Ok(Command::RetractAll));
        assert_eq!("unlock".parse::<Command>(), Ok(Command::UnlockAll));
        assert_eq!("unlock_retract".parse::<Command>(), Ok(Command::UnlockThenRetract));
        assert_eq!("unlock_extend".parse::<Command>(), Ok(Command::UnlockThenExtend));
    }

    #[test]
    fn test_exact_match_only() {
        for text in ["ON", " on", "on ", "extend_all", ""] {
            assert_eq!(
                text.parse::<Command>(),
                Err(CommandError::Unknown(text.to_string())),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_vocabulary_all_parse() {
        for text in Command::VOCABULARY {
            let command: Command = text.parse().unwrap();
            // `on` 是 `on_longlegs` 的别名
            let canonical = if text == "on" { "on_longlegs" } else { text };
            assert_eq!(command.to_string(), canonical);
        }
    }
}
