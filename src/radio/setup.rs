//! Radio Bring-up
//!
//! Brings the NRF24L01 and its three control lines into an interrupt-ready
//! state. Runs once, before the global interrupt gate is opened.

use core::fmt;

use crate::config::{pins, AUTO_ACK, PAYLOAD_WIDTH};
use crate::hal::{Board, ClockControl, IrqHandler, ReadyWait};
use crate::radio::{RadioRegisters, Role};
use crate::types::{Edge, PinId};

/// Control lines between the MCU and the radio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadioLines {
    /// Chip enable (output)
    pub ce: PinId,
    /// Chip select, active low (output)
    pub csn: PinId,
    /// Interrupt request, active low (input)
    pub irq: PinId,
}

impl RadioLines {
    /// Board wiring from [`pins`]
    pub const BOARD: Self = Self {
        ce: pins::RADIO_CE,
        csn: pins::RADIO_CSN,
        irq: pins::RADIO_IRQ,
    };
}

impl Default for RadioLines {
    fn default() -> Self {
        Self::BOARD
    }
}

/// Bring-up failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// The clock domain of this line never reported ready within the poll bound
    ClockNotReady(PinId),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockNotReady(pin) => write!(f, "clock domain of {pin} never became ready"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SetupError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::ClockNotReady(pin) => defmt::write!(f, "ClockNotReady({})", pin),
        }
    }
}

/// Make sure the clock domain of `pin` runs
///
/// Enables the domain only when it is not ready yet; re-enabling a running
/// domain is skipped.
pub fn ensure_clock<C: ClockControl + ?Sized>(
    clock: &mut C,
    pin: PinId,
    wait: ReadyWait,
) -> Result<(), SetupError> {
    if clock.is_ready(pin.port()) {
        return Ok(());
    }
    debug!("enabling clock for port of {}", pin);
    clock.enable(pin.port());
    if wait.wait(clock, pin.port()) {
        Ok(())
    } else {
        Err(SetupError::ClockNotReady(pin))
    }
}

/// Run the radio bring-up sequence
///
/// 1. clocks for CE, CSN and IRQ
/// 2. CE and CSN as outputs, IRQ as input
/// 3. IRQ on falling edge
/// 4. register `handler`, unmask the line
/// 5. radio: receiver, [`PAYLOAD_WIDTH`] byte payload, auto-ack [`AUTO_ACK`]
/// 6. flush RX and TX FIFOs
///
/// With [`ReadyWait::Unbounded`] this never returns if a clock domain stays
/// off. The global interrupt gate is left alone.
pub fn initialize<B, R>(
    board: &mut B,
    radio: &mut R,
    lines: RadioLines,
    handler: IrqHandler,
    wait: ReadyWait,
) -> Result<(), SetupError>
where
    B: Board + ?Sized,
    R: RadioRegisters + ?Sized,
{
    for pin in [lines.ce, lines.csn, lines.irq] {
        ensure_clock(board, pin, wait)?;
    }

    board.make_output(lines.ce);
    board.make_output(lines.csn);
    board.make_input(lines.irq);

    board.set_edge(lines.irq, Edge::Falling);
    board.register(lines.irq, handler);
    board.enable_line(lines.irq);

    radio.initialize(Role::Receiver, PAYLOAD_WIDTH, AUTO_ACK);
    radio.flush_rx();
    radio.flush_tx();

    info!("radio ready, irq armed on {}", lines.irq);
    Ok(())
}
