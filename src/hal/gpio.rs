//! GPIO Abstractions
//!
//! Type-safe wrappers for the status LED and the user button. Both are
//! generic over the `embedded-hal` digital traits so the same code drives
//! embassy pins on the board and mock pins in host tests.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::config::BUTTON_DEBOUNCE_SAMPLES;
use crate::hal::IndicatorPort;
use crate::types::{LedChannels, LedColor};

/// RGB status LED on three active-high pins
pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    channels: LedChannels,
}

impl<R, G, B> RgbLed<R, G, B>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
{
    /// Take the three channel pins and switch everything off
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut led = Self {
            red,
            green,
            blue,
            channels: LedChannels::OFF,
        };
        led.apply(LedChannels::OFF);
        led
    }

    /// Drive a named color
    pub fn show(&mut self, color: LedColor) {
        self.apply(LedChannels::from_color(color));
    }

    /// Release the pins
    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }

    fn apply(&mut self, channels: LedChannels) {
        let red = self.red.set_state(PinState::from(channels.red())).is_ok();
        let green = self.green.set_state(PinState::from(channels.green())).is_ok();
        let blue = self.blue.set_state(PinState::from(channels.blue())).is_ok();
        if !(red && green && blue) {
            warn!("indicator pin write failed");
        }
        self.channels = channels;
    }
}

impl<R, G, B> IndicatorPort for RgbLed<R, G, B>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
{
    fn read(&self) -> LedChannels {
        self.channels
    }

    fn write(&mut self, channels: LedChannels) {
        self.apply(channels);
    }
}

/// Electrical level that means "pressed"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActiveLevel {
    /// Pressed pulls the line low (pull-up wiring)
    #[default]
    Low,
    /// Pressed drives the line high (pull-down wiring)
    High,
}

/// Debounced button state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Button is released
    #[default]
    Released,
    /// Button is pressed
    Pressed,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ButtonState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Released => defmt::write!(f, "Released"),
            Self::Pressed => defmt::write!(f, "Pressed"),
        }
    }
}

/// Push button with sample-count debouncing
pub struct PushButton<P> {
    pin: P,
    active: ActiveLevel,
    state: ButtonState,
    last_raw: bool,
    stable_count: u8,
}

impl<P: InputPin> PushButton<P> {
    /// Create a button (starts released)
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        Self {
            pin,
            active,
            state: ButtonState::Released,
            last_raw: false,
            stable_count: 0,
        }
    }

    /// Sample the pin (call periodically)
    ///
    /// Returns the new state when a debounced transition happened. A failed
    /// pin read counts as "not pressed".
    pub fn update(&mut self) -> Option<ButtonState> {
        let level = match self.active {
            ActiveLevel::Low => self.pin.is_low(),
            ActiveLevel::High => self.pin.is_high(),
        };
        let pressed = level.unwrap_or(false);

        if pressed == self.last_raw {
            if self.stable_count < BUTTON_DEBOUNCE_SAMPLES {
                self.stable_count += 1;
            }
        } else {
            self.last_raw = pressed;
            self.stable_count = 1;
        }

        if self.stable_count < BUTTON_DEBOUNCE_SAMPLES {
            return None;
        }

        let new_state = if pressed {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        };

        if new_state == self.state {
            None
        } else {
            self.state = new_state;
            Some(new_state)
        }
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> ButtonState {
        self.state
    }

    /// Check if pressed
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        matches!(self.state, ButtonState::Pressed)
    }
}
