//! Shared types used across the firmware
//!
//! Domain types for pins, system state and the RGB status indicator.
//! Colors and states are plain enums so the monitor logic stays testable
//! without any hardware attached.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

/// GPIO port identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    /// GPIOA
    A,
    /// GPIOB
    B,
    /// GPIOC
    C,
    /// GPIOD
    D,
    /// GPIOE
    E,
    /// GPIOF
    F,
    /// GPIOG
    G,
}

impl Port {
    /// Port index as used by the EXTI source multiplexer (A = 0)
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
            Self::E => 4,
            Self::F => 5,
            Self::G => 6,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Port {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::A => defmt::write!(f, "A"),
            Self::B => defmt::write!(f, "B"),
            Self::C => defmt::write!(f, "C"),
            Self::D => defmt::write!(f, "D"),
            Self::E => defmt::write!(f, "E"),
            Self::F => defmt::write!(f, "F"),
            Self::G => defmt::write!(f, "G"),
        }
    }
}

/// A single GPIO line (port + pin number 0-15)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinId {
    port: Port,
    pin: u8,
}

impl PinId {
    /// Create a pin identifier; the pin number is masked to 0-15
    #[must_use]
    pub const fn new(port: Port, pin: u8) -> Self {
        Self {
            port,
            pin: pin & 0x0F,
        }
    }

    /// Port this pin belongs to
    #[must_use]
    pub const fn port(self) -> Port {
        self.port
    }

    /// Pin number within the port (also the EXTI line number)
    #[must_use]
    pub const fn pin(self) -> u8 {
        self.pin
    }

    /// Single-bit mask for port-wide registers
    #[must_use]
    pub const fn mask(self) -> u16 {
        1 << self.pin
    }
}

impl fmt::Debug for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:?}{}", self.port, self.pin)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:?}{}", self.port, self.pin)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PinId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "P{}{}", self.port, self.pin);
    }
}

/// Edge that triggers a GPIO interrupt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// High to low transition
    Falling,
    /// Low to high transition
    Rising,
    /// Either transition
    Both,
}

impl Edge {
    /// Whether the falling-edge trigger bit should be set
    #[must_use]
    pub const fn falling(self) -> bool {
        matches!(self, Self::Falling | Self::Both)
    }

    /// Whether the rising-edge trigger bit should be set
    #[must_use]
    pub const fn rising(self) -> bool {
        matches!(self, Self::Rising | Self::Both)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Edge {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Falling => defmt::write!(f, "Falling"),
            Self::Rising => defmt::write!(f, "Rising"),
            Self::Both => defmt::write!(f, "Both"),
        }
    }
}

/// Overall health of the system as shown on the status LED
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SystemState {
    /// Everything nominal (flashing blue)
    #[default]
    Normal = 0,
    /// Something needs attention (flashing yellow)
    Warning = 1,
    /// Stopped (steady red)
    Fail = 2,
}

impl SystemState {
    /// Decode from the raw representation, unknown values are treated as `Fail`
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Normal,
            1 => Self::Warning,
            _ => Self::Fail,
        }
    }

    /// Raw representation
    #[must_use]
    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Warning => write!(f, "WARNING"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SystemState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Normal => defmt::write!(f, "NORMAL"),
            Self::Warning => defmt::write!(f, "WARNING"),
            Self::Fail => defmt::write!(f, "FAIL"),
        }
    }
}

/// System state shared between thread mode (writer) and the tick interrupt (reader)
#[derive(Debug, Default)]
pub struct SharedSystemState(AtomicU8);

impl SharedSystemState {
    /// Create with an initial state
    #[must_use]
    pub const fn new(state: SystemState) -> Self {
        Self(AtomicU8::new(state.as_raw()))
    }

    /// Current state
    pub fn get(&self) -> SystemState {
        SystemState::from_raw(self.0.load(Ordering::Relaxed))
    }

    /// Replace the state, returning the previous one
    pub fn set(&self, state: SystemState) -> SystemState {
        SystemState::from_raw(self.0.swap(state.as_raw(), Ordering::Relaxed))
    }
}

/// Named colors of the RGB indicator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedColor {
    /// All channels off
    Off,
    /// Red channel
    Red,
    /// Blue channel
    Blue,
    /// Green channel
    Green,
    /// Red + green
    Yellow,
}

impl LedColor {
    /// Red channel bit
    pub const RED_BIT: u8 = 0x02;
    /// Blue channel bit
    pub const BLUE_BIT: u8 = 0x04;
    /// Green channel bit
    pub const GREEN_BIT: u8 = 0x08;
    /// All channel bits
    pub const ALL_BITS: u8 = Self::RED_BIT | Self::BLUE_BIT | Self::GREEN_BIT;

    /// Channel bits that make up this color
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Red => Self::RED_BIT,
            Self::Blue => Self::BLUE_BIT,
            Self::Green => Self::GREEN_BIT,
            Self::Yellow => Self::RED_BIT | Self::GREEN_BIT,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LedColor {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "off"),
            Self::Red => defmt::write!(f, "red"),
            Self::Blue => defmt::write!(f, "blue"),
            Self::Green => defmt::write!(f, "green"),
            Self::Yellow => defmt::write!(f, "yellow"),
        }
    }
}

/// Raw drive pattern of the three indicator channels
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct LedChannels(u8);

impl LedChannels {
    /// Everything off
    pub const OFF: Self = Self(0);

    /// Build from raw bits, anything outside the three channels is dropped
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & LedColor::ALL_BITS)
    }

    /// Build the exact pattern of a color
    #[must_use]
    pub const fn from_color(color: LedColor) -> Self {
        Self(color.bits())
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Invert the channels belonging to `color`, leave the others alone
    #[must_use]
    pub const fn toggle(self, color: LedColor) -> Self {
        Self(self.0 ^ color.bits())
    }

    /// Whether every channel of `color` is driven
    #[must_use]
    pub const fn contains(self, color: LedColor) -> bool {
        self.0 & color.bits() == color.bits()
    }

    /// Red channel driven
    #[must_use]
    pub const fn red(self) -> bool {
        self.0 & LedColor::RED_BIT != 0
    }

    /// Blue channel driven
    #[must_use]
    pub const fn blue(self) -> bool {
        self.0 & LedColor::BLUE_BIT != 0
    }

    /// Green channel driven
    #[must_use]
    pub const fn green(self) -> bool {
        self.0 & LedColor::GREEN_BIT != 0
    }

    /// Named color for this exact pattern, if there is one
    #[must_use]
    pub const fn color(self) -> Option<LedColor> {
        match self.0 {
            0 => Some(LedColor::Off),
            LedColor::RED_BIT => Some(LedColor::Red),
            LedColor::BLUE_BIT => Some(LedColor::Blue),
            LedColor::GREEN_BIT => Some(LedColor::Green),
            0x0A => Some(LedColor::Yellow),
            _ => None,
        }
    }
}

impl fmt::Debug for LedChannels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LedChannels({:#04x})", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LedChannels {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "LedChannels({=u8:#04x})", self.0);
    }
}
