//! Status Monitor
//!
//! Software timer driven by the 1 µs tick. Every [`MONITOR_PERIOD_TICKS`]
//! ticks it renders the current [`SystemState`] on the RGB indicator:
//! flashing blue, flashing yellow, or steady red.
//!
//! [`MONITOR_PERIOD_TICKS`]: crate::config::MONITOR_PERIOD_TICKS

pub mod indicator;
pub mod tick;

pub use indicator::{action_for, IndicatorAction};
pub use tick::TickSource;

use crate::config::MONITOR_PERIOD_TICKS;
use crate::hal::IndicatorPort;
use crate::types::SystemState;

/// Periodic indicator update
///
/// Owns the monitor tick counter. Only the [`TickSource`] advances it; the
/// monitor itself resets it when an update fires.
#[derive(Clone, Debug)]
pub struct Monitor {
    period: u32,
    ticks: u32,
}

impl Monitor {
    /// Monitor firing every `period` ticks (at least 1)
    #[must_use]
    pub const fn new(period: u32) -> Self {
        Self {
            period: if period == 0 { 1 } else { period },
            ticks: 0,
        }
    }

    /// Ticks between updates
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Ticks accumulated since the last update
    #[must_use]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    pub(crate) fn count_tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Run one monitor step
    ///
    /// Below the threshold nothing happens. At the threshold the counter goes
    /// back to zero and the action for `state` is applied to `indicator`.
    pub fn poll<I>(&mut self, state: SystemState, indicator: &mut I) -> Option<IndicatorAction>
    where
        I: IndicatorPort + ?Sized,
    {
        if self.ticks < self.period {
            return None;
        }
        self.ticks = 0;

        let action = action_for(state);
        indicator.write(action.apply(indicator.read()));
        Some(action)
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(MONITOR_PERIOD_TICKS)
    }
}
