//! Radio Control Logic
//!
//! Bring-up sequence, interrupt handling and the button-driven link
//! supervisor for the NRF24L01. The core only sees the radio through
//! [`RadioRegisters`], a fire-and-forget set of named register operations.

pub mod irq;
pub mod link;
pub mod setup;

/// Primary role of the transceiver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Role {
    /// Primary receiver (PRIM_RX = 1)
    #[default]
    Receiver,
    /// Primary transmitter (PRIM_RX = 0)
    Transmitter,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Role {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Receiver => defmt::write!(f, "PRX"),
            Self::Transmitter => defmt::write!(f, "PTX"),
        }
    }
}

/// Named register operations of the radio
///
/// None of these report failure: at this layer every register transaction
/// is assumed to succeed.
pub trait RadioRegisters {
    /// Configure role, pipe 0 payload width and auto-acknowledge, then power up
    fn initialize(&mut self, role: Role, payload_width: u8, auto_ack: bool);

    /// Discard the RX FIFO
    fn flush_rx(&mut self);

    /// Discard the TX FIFO
    fn flush_tx(&mut self);

    /// Clear every interrupt flag in STATUS
    fn clear_all_irq(&mut self);

    /// Start transmitting a single byte
    fn send_byte(&mut self, byte: u8);

    /// Go back to receiving
    fn listen(&mut self);
}
