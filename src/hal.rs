//! Hardware Abstraction Layer
//!
//! The radio core never touches registers directly. Everything it needs from
//! the microcontroller is expressed by the traits in this module: clock
//! gating, pin direction, edge interrupts and the status indicator. The
//! STM32G474 implementation lives in [`stm32`] and is only built for the
//! target; host tests provide their own fakes.

use crate::types::{Edge, LedChannels, PinId, Port};

pub mod gpio;

#[cfg(feature = "embedded")]
pub mod stm32;

/// Interrupt handler entry point registered for a GPIO line
pub type IrqHandler = fn();

/// Peripheral clock gating for GPIO ports
pub trait ClockControl {
    /// Whether the port's clock domain is running and its registers are accessible
    fn is_ready(&mut self, port: Port) -> bool;

    /// Turn on the port's clock domain (may take a few cycles to become ready)
    fn enable(&mut self, port: Port);
}

/// GPIO direction configuration
pub trait PinControl {
    /// Configure the pin as push-pull output
    fn make_output(&mut self, pin: PinId);

    /// Configure the pin as input
    fn make_input(&mut self, pin: PinId);
}

/// Line-level GPIO interrupt control
///
/// Calls are expected in the order `set_edge`, `register`, `enable_line`.
pub trait EdgeInterrupt {
    /// Select the edge that triggers the line
    fn set_edge(&mut self, pin: PinId, edge: Edge);

    /// Attach the handler invoked when the line fires
    fn register(&mut self, pin: PinId, handler: IrqHandler);

    /// Unmask the line (the global interrupt gate is not touched)
    fn enable_line(&mut self, pin: PinId);

    /// Acknowledge a pending interrupt so the line can fire again
    fn clear_pending(&mut self, pin: PinId);
}

/// Everything the radio bring-up sequence needs from the board
pub trait Board: ClockControl + PinControl + EdgeInterrupt {}

impl<T: ClockControl + PinControl + EdgeInterrupt> Board for T {}

/// Global interrupt gate
pub trait GlobalInterrupts {
    /// Open the gate for every enabled interrupt source
    fn enable_all(&mut self);
}

/// Whether a BASEPRI value of `basepri` blocks an interrupt at `priority`
///
/// Zero disables BASEPRI masking. Otherwise every priority numerically at or
/// above the ceiling waits.
#[must_use]
pub const fn is_masked(basepri: u8, priority: u8) -> bool {
    basepri != 0 && priority >= basepri
}

/// Three-channel status indicator
pub trait IndicatorPort {
    /// Pattern currently driven
    fn read(&self) -> LedChannels;

    /// Drive a new pattern
    fn write(&mut self, channels: LedChannels);
}

/// How long to poll a clock domain for readiness
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReadyWait {
    /// Spin until ready, forever if need be
    #[default]
    Unbounded,
    /// Give up after this many polls
    Bounded(u32),
}

impl ReadyWait {
    /// Poll `clock` until `port` reports ready; `false` if the bound ran out
    pub fn wait<C: ClockControl + ?Sized>(self, clock: &mut C, port: Port) -> bool {
        match self {
            Self::Unbounded => {
                while !clock.is_ready(port) {
                    core::hint::spin_loop();
                }
                true
            }
            Self::Bounded(polls) => (0..polls).any(|_| clock.is_ready(port)),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ReadyWait {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Unbounded => defmt::write!(f, "Unbounded"),
            Self::Bounded(n) => defmt::write!(f, "Bounded({})", n),
        }
    }
}
