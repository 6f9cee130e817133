//! State to indicator mapping

use crate::types::{LedChannels, LedColor, SystemState};

/// What the monitor does to the indicator on an update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorAction {
    /// Invert the channels of this color, keep the rest
    Toggle(LedColor),
    /// Drive exactly this color
    Set(LedColor),
}

impl IndicatorAction {
    /// Pattern after applying the action to `current`
    #[must_use]
    pub const fn apply(self, current: LedChannels) -> LedChannels {
        match self {
            Self::Toggle(color) => current.toggle(color),
            Self::Set(color) => LedChannels::from_color(color),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for IndicatorAction {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Toggle(color) => defmt::write!(f, "Toggle({})", color),
            Self::Set(color) => defmt::write!(f, "Set({})", color),
        }
    }
}

/// Indicator action for a system state
///
/// Normal and Warning flash, Fail is steady.
#[must_use]
pub const fn action_for(state: SystemState) -> IndicatorAction {
    match state {
        SystemState::Normal => IndicatorAction::Toggle(LedColor::Blue),
        SystemState::Warning => IndicatorAction::Toggle(LedColor::Yellow),
        SystemState::Fail => IndicatorAction::Set(LedColor::Red),
    }
}
