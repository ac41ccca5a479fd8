//! # Leveler Core
//!
//! 多腿着陆平台的闭环调平控制器。
//!
//! 每条着陆腿带一个向下测距的传感器、一个直线执行器和一个着地锁。
//! 控制器周期性地测量各腿对地距离，计算让平台保持水平的执行器目标，
//! 并以限速方式驱动执行器；任一腿锁定（已着陆）后自动停止调平。
//!
//! ## 模块
//!
//! | 模块 | 用途 |
//! | ---- | ---- |
//! | [`leg`] | 单腿模型：测距、目标计算、执行器驱动 |
//! | [`fleet`] | 控制器状态机、调平周期、关闭计时器 |
//! | [`command`] | 操作员文本命令 |
//! | [`status`] | 状态报告与显示输出 |
//! | [`discovery`] | 按组名发现着陆腿和显示输出 |
//! | [`config`] | TOML 配置 |
//!
//! ## 示例
//!
//! ```rust,ignore
//! use leveler_core::{FleetController, LevelerConfig, discover_legs};
//!
//! let config = LevelerConfig::default();
//! let discovery = discover_legs(&config, |name| groups.remove(name));
//! let mut fleet = FleetController::new(&config, discovery.legs, displays);
//!
//! fleet.handle_text("on_shortlegs");
//! loop {
//!     fleet.tick_fast();
//!     // 每 10 个快周期
//!     fleet.tick_slow();
//! }
//! ```

pub mod command;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fleet;
pub mod leg;
pub mod mode;
pub mod status;

pub use command::Command;
pub use config::{CadenceConfig, LegTuning, LevelerConfig};
pub use discovery::{Discovery, KitGroup, discover_legs, select_displays};
pub use error::{CommandError, ConfigError, DiscoveryError};
pub use fleet::{BoxedDisplay, FleetController};
pub use leg::{BoxedActuator, BoxedLock, BoxedSensor, Leg};
pub use mode::{LegPreference, Mode};
pub use status::{DisplaySink, FontColor, MemorySink, StatusReport};

// 重新导出硬件抽象层
pub use leveler_hal as hal;
