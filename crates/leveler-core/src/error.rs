//! 控制层错误类型定义
//!
//! 控制循环本身不产生错误（最佳努力），错误只出现在配置加载、
//! 着陆腿发现和命令解析这几个边界上。

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// 配置值不合法
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 着陆腿发现错误（遇到即停止发现）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// 找不到该名称的组
    #[error("Group {0} not found")]
    MissingGroup(String),

    /// 组内组件数量不正确
    #[error(
        "Group {name} has a wrong setup (need exactly 1 sensor, 1 actuator, 1 lock; found {sensors}, {actuators}, {locks})"
    )]
    InvalidSetup {
        name: String,
        sensors: usize,
        actuators: usize,
        locks: usize,
    },
}

/// 命令解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0:?}")]
    Unknown(String),
}
