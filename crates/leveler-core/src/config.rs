//! # 控制器配置
//!
//! 所有字段都有默认值，TOML 文件只需写出要覆盖的项：
//!
//! ```toml
//! turnoff_duration = 5
//!
//! [leg]
//! max_range = 60.0
//!
//! [cadence]
//! fast_period_ms = 100
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 控制器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelerConfig {
    /// 全局伸出/收回后自动关闭前等待的慢周期数
    ///
    /// 慢周期约为 100 帧（60 Hz），默认 3 个周期约 5 秒。
    pub turnoff_duration: u32,

    /// 状态显示屏名称：名称中包含此字符串的显示屏都会输出状态
    pub display_name: String,

    /// 着陆腿组名前缀，组名为 `{kit_prefix}1`、`{kit_prefix}2`……
    pub kit_prefix: String,

    /// 最多发现的着陆腿数量
    pub max_kits: usize,

    /// 单腿调节参数
    pub leg: LegTuning,

    /// 调度周期
    pub cadence: CadenceConfig,
}

impl Default for LevelerConfig {
    fn default() -> Self {
        Self {
            turnoff_duration: 3,
            display_name: "LGB_LCD".to_string(),
            kit_prefix: "LGB_kit".to_string(),
            max_kits: 100,
            leg: LegTuning::default(),
            cadence: CadenceConfig::default(),
        }
    }
}

impl LevelerConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        let leg = &self.leg;
        if !(leg.max_range.is_finite() && leg.max_range > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "leg.max_range must be positive, got {}",
                leg.max_range
            )));
        }
        if !(leg.tolerance > 0.0 && leg.tolerance < leg.max_range) {
            return Err(ConfigError::Invalid(format!(
                "leg.tolerance must be in (0, max_range), got {}",
                leg.tolerance
            )));
        }
        if !(leg.speed.is_finite() && leg.speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "leg.speed must be positive, got {}",
                leg.speed
            )));
        }
        if self.max_kits == 0 {
            return Err(ConfigError::Invalid("max_kits must be at least 1".to_string()));
        }
        if self.kit_prefix.is_empty() {
            return Err(ConfigError::Invalid("kit_prefix must not be empty".to_string()));
        }
        if self.cadence.fast_period_ms == 0 || self.cadence.slow_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "cadence periods must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// 第 `index` 条腿（从 1 开始）的组名
    pub fn kit_name(&self, index: usize) -> String {
        format!("{}{}", self.kit_prefix, index)
    }
}

/// 单腿调节参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegTuning {
    /// 最大测距距离（同时也是无命中/被遮挡时报告的距离）
    pub max_range: f64,

    /// 位置容差：执行器与目标相差不超过此值时保持不动
    pub tolerance: f64,

    /// 执行器速度
    pub speed: f64,
}

impl Default for LegTuning {
    fn default() -> Self {
        Self {
            max_range: 100.0,
            tolerance: 0.02,
            speed: 0.5,
        }
    }
}

/// 调度周期配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// 快周期（调平 + 锁定检查 + 状态刷新），默认约 10 帧
    pub fast_period_ms: u64,

    /// 慢周期（关闭计时器倒数），默认约 100 帧
    pub slow_period_ms: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            fast_period_ms: 167,
            slow_period_ms: 1667,
        }
    }
}

impl CadenceConfig {
    pub fn fast_period(&self) -> Duration {
        Duration::from_millis(self.fast_period_ms)
    }

    pub fn slow_period(&self) -> Duration {
        Duration::from_millis(self.slow_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LevelerConfig::default();
        assert_eq!(config.turnoff_duration, 3);
        assert_eq!(config.display_name, "LGB_LCD");
        assert_eq!(config.leg.max_range, 100.0);
        assert_eq!(config.leg.tolerance, 0.02);
        assert_eq!(config.leg.speed, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = LevelerConfig::from_toml_str(
            r#"
            turnoff_duration = 5

            [leg]
            max_range = 60.0
            "#,
        )
        .unwrap();

        assert_eq!(config.turnoff_duration, 5);
        assert_eq!(config.leg.max_range, 60.0);
        assert_eq!(config.leg.speed, 0.5);
        assert_eq!(config.cadence, CadenceConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = LevelerConfig::from_toml_str("[leg]\nspeed = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = LevelerConfig::from_toml_str("[leg]\ntolerance = 200.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = LevelerConfig::from_toml_str("max_kits = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = LevelerConfig::from_toml_str("[cadence]\nslow_period_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = LevelerConfig::from_toml_str("turnoff_duration = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "kit_prefix = \"LEG_\"\nmax_kits = 4").unwrap();

        let config = LevelerConfig::load(file.path()).unwrap();
        assert_eq!(config.kit_name(2), "LEG_2");
        assert_eq!(config.max_kits, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LevelerConfig::load("/nonexistent/leveler.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
