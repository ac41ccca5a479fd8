//! 控制器端到端场景测试
//!
//! 使用脚本化硬件驱动快/慢周期，验证调平、锁定保护和关闭计时器。

mod common;

use std::sync::Arc;

use common::{scripted_fleet, step_actuators};
use leveler_core::hal::LinearActuator;
use leveler_core::hal::mock::SensorReply;
use leveler_core::{
    BoxedDisplay, Command, FleetController, FontColor, Leg, LegPreference, LevelerConfig,
    MemorySink, Mode,
};
use parking_lot::Mutex;

/// 场景 1：三条腿距离 [10, 15, 20]，长腿优先，行程 [0, 10]
#[test]
fn test_long_legs_targets_relative_to_fleet_max() {
    let config = LevelerConfig::default();
    let (mut fleet, _handles) = scripted_fleet(&config, &[10.0, 15.0, 20.0], (0.0, 10.0), vec![]);

    fleet.turn_on(LegPreference::PreferLongLegs);
    fleet.tick_fast();

    assert_eq!(fleet.max_distance(), 20.0);
    let targets: Vec<f64> = fleet.legs().iter().map(Leg::computed_target).collect();
    assert_eq!(targets, vec![0.0, 5.0, 10.0]);
}

/// 场景 1 的短腿优先版本：离地最近的腿保持全收回
#[test]
fn test_short_legs_targets_relative_to_fleet_min() {
    let config = LevelerConfig::default();
    let (mut fleet, _handles) = scripted_fleet(&config, &[10.0, 15.0, 20.0], (0.0, 10.0), vec![]);

    fleet.handle_text("on_shortlegs");
    fleet.tick_fast();

    let targets: Vec<f64> = fleet.legs().iter().map(Leg::computed_target).collect();
    assert_eq!(targets, vec![0.0, 5.0, 10.0]);
    assert_eq!(fleet.min_distance(), 10.0);
}

/// 场景 2：短腿模式下一条腿锁定，下一个快周期进入 Idle 并禁用全部腿
#[test]
fn test_lock_engagement_forces_idle() {
    let config = LevelerConfig::default();
    let (mut fleet, handles) = scripted_fleet(&config, &[10.0, 11.0, 12.0, 13.0], (0.0, 10.0), vec![]);

    fleet.handle_text("on_shortlegs");
    fleet.tick_fast();
    assert_eq!(fleet.mode(), Mode::Active);

    handles[2].lock.set_locked(true);
    let scans_before: Vec<usize> = handles.iter().map(|h| h.sensor.scan_count()).collect();

    fleet.tick_fast();
    assert_eq!(fleet.mode(), Mode::Idle);
    assert!(fleet.legs().iter().all(|leg| !leg.is_enabled()));
    assert!(handles.iter().all(|h| !h.actuator.is_powered()));

    // 锁定后不再测距/驱动
    let scans_after: Vec<usize> = handles.iter().map(|h| h.sensor.scan_count()).collect();
    assert_eq!(scans_before, scans_after);

    // 之后的快周期保持 Idle
    fleet.tick_fast();
    assert_eq!(fleet.mode(), Mode::Idle);
}

/// 场景 3：`retract`，turnoff_duration = 3
#[test]
fn test_retract_turns_off_after_duration() {
    let config = LevelerConfig {
        turnoff_duration: 3,
        ..LevelerConfig::default()
    };
    let (mut fleet, handles) = scripted_fleet(&config, &[10.0, 12.0], (0.0, 10.0), vec![]);

    fleet.handle_text("retract");
    assert_eq!(fleet.mode(), Mode::RetractingAll { remaining: 3 });
    assert!(handles.iter().all(|h| h.actuator.velocity() < 0.0));

    fleet.tick_slow();
    fleet.tick_slow();
    assert!(matches!(fleet.mode(), Mode::RetractingAll { .. }));

    fleet.tick_slow();
    assert_eq!(fleet.mode(), Mode::Idle);
}

/// 计时中 `on` 取消关闭，之后不会误转 Idle
#[test]
fn test_turn_on_cancels_pending_shutdown() {
    let config = LevelerConfig::default();
    let (mut fleet, _handles) = scripted_fleet(&config, &[10.0, 12.0], (0.0, 10.0), vec![]);

    fleet.extend_all();
    fleet.tick_slow();
    assert_eq!(fleet.shutdown_timer(), Some(2));

    fleet.handle_text("on");
    assert_eq!(fleet.shutdown_timer(), None);

    for _ in 0..10 {
        fleet.tick_slow();
        fleet.tick_fast();
    }
    assert_eq!(fleet.mode(), Mode::Active);
}

/// 后发命令覆盖计时器
#[test]
fn test_timer_restarted_by_new_global_move() {
    let config = LevelerConfig::default();
    let (mut fleet, _handles) = scripted_fleet(&config, &[10.0], (0.0, 10.0), vec![]);

    fleet.apply(Command::ExtendAll);
    fleet.tick_slow();
    fleet.tick_slow();
    fleet.apply(Command::RetractAll);
    assert_eq!(fleet.shutdown_timer(), Some(3));

    fleet.tick_slow();
    fleet.tick_slow();
    assert!(matches!(fleet.mode(), Mode::RetractingAll { .. }));
    fleet.tick_slow();
    assert_eq!(fleet.mode(), Mode::Idle);
}

/// 完整的着陆流程：调平收敛，着地后自动锁定并停止
#[test]
fn test_landing_converges_then_locks() {
    let config = LevelerConfig::default();
    let (mut fleet, handles) = scripted_fleet(&config, &[30.0, 32.0, 33.5, 31.0], (0.0, 5.0), vec![]);

    fleet.turn_on(LegPreference::PreferLongLegs);
    for _ in 0..200 {
        fleet.tick_fast();
        step_actuators(&handles, 0.2);
    }

    // 腿尖应处于同一高度：伸出量 + 对地距离 = 常数
    let feet: Vec<f64> = fleet
        .legs()
        .iter()
        .map(|leg| leg.last_distance() - leg.actuator_position())
        .collect();
    for foot in &feet {
        assert!((foot - feet[0]).abs() <= 0.05, "feet not level: {:?}", feet);
    }
    // 离地最远的腿保持全伸出
    assert!((handles[2].actuator.position() - 5.0).abs() <= 0.02);
    assert!(handles.iter().all(|h| h.actuator.velocity() == 0.0));

    // 自动锁定已武装，接触地面即锁住
    handles[0].lock.touch_down();
    fleet.tick_fast();
    assert_eq!(fleet.mode(), Mode::Idle);
}

/// 测距暂时不可用时保留上次距离
#[test]
fn test_sensor_cooldown_keeps_previous_distance() {
    let config = LevelerConfig::default();
    let (mut fleet, handles) = scripted_fleet(&config, &[10.0, 20.0], (0.0, 10.0), vec![]);

    fleet.turn_on(LegPreference::PreferLongLegs);
    fleet.tick_fast();

    handles[1].sensor.set_available(false);
    handles[1].set_ground(12.0);
    fleet.tick_fast();
    assert_eq!(fleet.max_distance(), 20.0);

    handles[1].sensor.set_available(true);
    fleet.tick_fast();
    assert_eq!(fleet.max_distance(), 12.0);
}

/// 被遮挡的传感器：报告最大距离并出现在显示屏上
#[test]
fn test_obstructed_sensor_reported_on_display() {
    let config = LevelerConfig::default();
    let sink = Arc::new(Mutex::new(MemorySink::new()));
    let displays: Vec<BoxedDisplay> = vec![Box::new(sink.clone())];
    let (mut fleet, handles) = scripted_fleet(&config, &[10.0, 11.0], (0.0, 10.0), displays);

    handles[1].sensor.set_reply(SensorReply::SelfHit);
    fleet.turn_on(LegPreference::PreferLongLegs);
    fleet.tick_fast();

    let sink = sink.lock();
    let report = sink.last().expect("one frame rendered");
    assert_eq!(report.obstructed, vec!["LGB_kit2".to_string()]);
    assert_eq!(report.font_color(), FontColor::Warning);
    assert_eq!(report.unevenness, 90.0);

    let text = sink.text().unwrap();
    assert!(text.contains("\nActive\nLong legs mode\nNb active kits: 2\nGnd unevenness:90.00"));
    assert!(text.ends_with("Obstructed camera on\nLGB_kit2"));
}

/// 显示屏模式标签随状态变化
#[test]
fn test_display_mode_labels() {
    let config = LevelerConfig::default();
    let sink = Arc::new(Mutex::new(MemorySink::new()));
    let displays: Vec<BoxedDisplay> = vec![Box::new(sink.clone())];
    let (mut fleet, _handles) = scripted_fleet(&config, &[10.0], (0.0, 10.0), displays);

    let label = |fleet: &mut FleetController| {
        fleet.tick_fast();
        sink.lock().last().map(|r| r.mode.label())
    };

    assert_eq!(label(&mut fleet), Some("Disabled"));
    fleet.handle_text("extend");
    assert_eq!(label(&mut fleet), Some("Global extend/retract"));
    fleet.handle_text("on_longlegs");
    assert_eq!(label(&mut fleet), Some("Active"));
    fleet.handle_text("off");
    assert_eq!(label(&mut fleet), Some("Disabled"));
}

/// `unlock_extend`：先解锁再伸出
#[test]
fn test_unlock_extend_after_landing() {
    let config = LevelerConfig::default();
    let (mut fleet, handles) = scripted_fleet(&config, &[10.0, 10.0], (0.0, 10.0), vec![]);

    fleet.turn_on(LegPreference::PreferLongLegs);
    for h in &handles {
        h.lock.touch_down();
    }
    fleet.tick_fast();
    assert_eq!(fleet.mode(), Mode::Idle);
    assert!(fleet.legs().iter().all(Leg::is_locked));

    fleet.handle_text("unlock_extend");
    assert!(fleet.legs().iter().all(|leg| !leg.is_locked()));
    assert_eq!(fleet.mode(), Mode::ExtendingAll { remaining: 3 });
    assert!(handles.iter().all(|h| h.actuator.velocity() > 0.0));
}

/// 无法识别的命令不改变任何状态
#[test]
fn test_unknown_command_is_noop() {
    let config = LevelerConfig::default();
    let (mut fleet, _handles) = scripted_fleet(&config, &[10.0], (0.0, 10.0), vec![]);

    fleet.handle_text("on");
    assert!(fleet.handle_text("land_now").is_none());
    assert!(fleet.handle_text("OFF").is_none());
    assert_eq!(fleet.mode(), Mode::Active);
}

/// 着陆后 Idle 中解锁：活塞保持原位
#[test]
fn test_unlock_while_idle_keeps_pistons_still() {
    let config = LevelerConfig::default();
    let (mut fleet, handles) = scripted_fleet(&config, &[10.0, 12.0], (0.0, 10.0), vec![]);

    fleet.turn_on(LegPreference::PreferLongLegs);
    fleet.tick_fast();
    handles[0].lock.touch_down();
    fleet.tick_fast();
    assert_eq!(fleet.mode(), Mode::Idle);

    let before: Vec<f64> = handles.iter().map(|h| h.actuator.position()).collect();
    assert!(fleet.handle_text("unlock").is_some());
    for _ in 0..50 {
        step_actuators(&handles, 0.2);
    }

    let after: Vec<f64> = handles.iter().map(|h| h.actuator.position()).collect();
    assert_eq!(fleet.mode(), Mode::Idle);
    assert_eq!(before, after);
    assert!(handles.iter().all(|h| !h.actuator.is_powered()));
    assert!(fleet.legs().iter().all(|leg| !leg.is_locked()));
}
