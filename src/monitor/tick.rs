//! Tick Source
//!
//! Body of the 1 µs timer interrupt. Advances the monotonic counter and the
//! monitor counter, then runs the monitor inline.

use super::{IndicatorAction, Monitor};
use crate::hal::IndicatorPort;
use crate::types::SystemState;

/// Tick counters plus the monitor they drive
///
/// The monotonic counter is never reset and wraps at `u32::MAX`.
#[derive(Clone, Debug, Default)]
pub struct TickSource {
    monotonic: u32,
    monitor: Monitor,
}

impl TickSource {
    /// Start at tick zero
    #[must_use]
    pub const fn new(monitor: Monitor) -> Self {
        Self::starting_at(0, monitor)
    }

    /// Start the monotonic counter at `initial`
    #[must_use]
    pub const fn starting_at(initial: u32, monitor: Monitor) -> Self {
        Self {
            monotonic: initial,
            monitor,
        }
    }

    /// Handle one timer period
    ///
    /// Returns the indicator action when the monitor fired on this tick.
    pub fn on_tick<I>(&mut self, state: SystemState, indicator: &mut I) -> Option<IndicatorAction>
    where
        I: IndicatorPort + ?Sized,
    {
        self.monotonic = self.monotonic.wrapping_add(1);
        self.monitor.count_tick();
        self.monitor.poll(state, indicator)
    }

    /// Monotonic tick count
    #[must_use]
    pub const fn now(&self) -> u32 {
        self.monotonic
    }

    /// Ticks elapsed since `earlier`, correct across one wrap
    #[must_use]
    pub const fn elapsed_since(&self, earlier: u32) -> u32 {
        self.monotonic.wrapping_sub(earlier)
    }

    /// Ticks accumulated by the monitor since its last update
    #[must_use]
    pub const fn monitor_ticks(&self) -> u32 {
        self.monitor.ticks()
    }

    /// The monitor driven by this source
    #[must_use]
    pub const fn monitor(&self) -> &Monitor {
        &self.monitor
    }
}
