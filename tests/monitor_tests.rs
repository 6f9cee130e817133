//! Status Monitor Tests
//!
//! Tick accounting and indicator rendering of the system state.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test monitor_tests

use nrf24_firmware::config::MONITOR_PERIOD_TICKS;
use nrf24_firmware::hal::IndicatorPort;
use nrf24_firmware::monitor::{action_for, IndicatorAction, Monitor, TickSource};
use nrf24_firmware::types::{LedChannels, LedColor, SystemState};

/// Indicator that remembers every pattern written to it
#[derive(Default)]
struct RecordingIndicator {
    current: LedChannels,
    writes: Vec<LedChannels>,
}

impl IndicatorPort for RecordingIndicator {
    fn read(&self) -> LedChannels {
        self.current
    }

    fn write(&mut self, channels: LedChannels) {
        self.current = channels;
        self.writes.push(channels);
    }
}

fn run(source: &mut TickSource, state: SystemState, ticks: u32, led: &mut RecordingIndicator) -> u32 {
    let mut fired = 0;
    for _ in 0..ticks {
        if source.on_tick(state, led).is_some() {
            fired += 1;
        }
    }
    fired
}

// ============================================================================
// Monitor Tests
// ============================================================================

#[test]
fn monitor_default_period() {
    let monitor = Monitor::default();
    assert_eq!(monitor.period(), MONITOR_PERIOD_TICKS);
    assert_eq!(monitor.ticks(), 0);
}

#[test]
fn monitor_zero_period_clamped() {
    assert_eq!(Monitor::new(0).period(), 1);
}

#[test]
fn monitor_below_threshold_is_noop() {
    let mut source = TickSource::default();
    let mut led = RecordingIndicator::default();
    let fired = run(&mut source, SystemState::Normal, MONITOR_PERIOD_TICKS - 1, &mut led);
    assert_eq!(fired, 0);
    assert!(led.writes.is_empty());
    assert_eq!(source.monitor_ticks(), MONITOR_PERIOD_TICKS - 1);
}

#[test]
fn monitor_fires_at_threshold_and_resets() {
    let mut source = TickSource::default();
    let mut led = RecordingIndicator::default();
    run(&mut source, SystemState::Normal, MONITOR_PERIOD_TICKS - 1, &mut led);

    let action = source.on_tick(SystemState::Normal, &mut led);
    assert_eq!(action, Some(IndicatorAction::Toggle(LedColor::Blue)));
    assert_eq!(source.monitor_ticks(), 0);
    assert_eq!(led.writes.len(), 1);
}

#[test]
fn action_for_each_state() {
    assert_eq!(action_for(SystemState::Normal), IndicatorAction::Toggle(LedColor::Blue));
    assert_eq!(action_for(SystemState::Warning), IndicatorAction::Toggle(LedColor::Yellow));
    assert_eq!(action_for(SystemState::Fail), IndicatorAction::Set(LedColor::Red));
}

#[test]
fn action_uses_state_at_threshold_only() {
    let mut source = TickSource::new(Monitor::new(10));
    let mut led = RecordingIndicator::default();
    // Fail before the threshold leaves no trace
    run(&mut source, SystemState::Fail, 9, &mut led);
    assert!(led.writes.is_empty());
    assert_eq!(
        source.on_tick(SystemState::Warning, &mut led),
        Some(IndicatorAction::Toggle(LedColor::Yellow))
    );
    assert_eq!(led.current.color(), Some(LedColor::Yellow));
}

// ============================================================================
// Tick Counter Tests
// ============================================================================

#[test]
fn monotonic_counts_every_tick() {
    let mut source = TickSource::starting_at(1_000, Monitor::default());
    let mut led = RecordingIndicator::default();
    run(&mut source, SystemState::Normal, 12_345, &mut led);
    assert_eq!(source.now(), 13_345);
    assert_eq!(source.elapsed_since(1_000), 12_345);
}

#[test]
fn monotonic_wraps_at_word_width() {
    let mut source = TickSource::starting_at(u32::MAX - 2, Monitor::default());
    let mut led = RecordingIndicator::default();
    run(&mut source, SystemState::Normal, 5, &mut led);
    assert_eq!(source.now(), 2);
    assert_eq!(source.elapsed_since(u32::MAX - 2), 5);
}

#[test]
fn normal_toggles_floor_n_over_period() {
    let mut source = TickSource::default();
    let mut led = RecordingIndicator::default();
    let n = 3 * MONITOR_PERIOD_TICKS + 4_321;
    let fired = run(&mut source, SystemState::Normal, n, &mut led);
    assert_eq!(fired, n / MONITOR_PERIOD_TICKS);
    assert_eq!(source.monitor_ticks(), n % MONITOR_PERIOD_TICKS);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn fail_holds_steady_red() {
    let mut source = TickSource::default();
    let mut led = RecordingIndicator::default();
    run(&mut source, SystemState::Fail, 250_000, &mut led);

    assert_eq!(led.writes.len(), 2);
    assert!(led
        .writes
        .iter()
        .all(|w| w.color() == Some(LedColor::Red)));
    assert_eq!(led.current.color(), Some(LedColor::Red));
}

#[test]
fn normal_from_off_ends_blue_after_three_toggles() {
    let mut source = TickSource::default();
    let mut led = RecordingIndicator::default();
    run(&mut source, SystemState::Normal, 300_000, &mut led);

    assert_eq!(led.writes.len(), 3);
    assert_eq!(led.writes[0].color(), Some(LedColor::Blue));
    assert_eq!(led.writes[1].color(), Some(LedColor::Off));
    assert_eq!(led.current.color(), Some(LedColor::Blue));
}

#[test]
fn warning_flashes_yellow() {
    let mut source = TickSource::default();
    let mut led = RecordingIndicator::default();
    run(&mut source, SystemState::Warning, 2 * MONITOR_PERIOD_TICKS, &mut led);

    assert_eq!(led.writes[0].color(), Some(LedColor::Yellow));
    assert_eq!(led.writes[1].color(), Some(LedColor::Off));
}

#[test]
fn recovery_from_fail_toggles_blue_on_top_of_red() {
    let mut source = TickSource::new(Monitor::new(4));
    let mut led = RecordingIndicator::default();
    run(&mut source, SystemState::Fail, 4, &mut led);
    run(&mut source, SystemState::Normal, 4, &mut led);

    // toggles leave unrelated channels alone
    assert!(led.current.red());
    assert!(led.current.blue());
    assert!(!led.current.green());
}
