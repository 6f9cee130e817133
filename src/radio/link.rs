//! Link Supervisor
//!
//! Button press sends one byte, then the supervisor watches the radio IRQ
//! line for the rest of the exchange. The transmit CONFIG masks TX_DS, so an
//! acknowledged send never pulls IRQ low. Only MAX_RT (retries exhausted)
//! does. An edge while a send is outstanding is therefore the failure, and
//! silence until the window closes means the byte was delivered.
//!
//! The supervisor only sees *that* an edge happened (via
//! [`EdgeCounter`](super::irq::EdgeCounter)), never why. Edges while
//! listening are received traffic and are ignored.

use crate::radio::RadioRegisters;
use crate::types::SystemState;

/// Supervisor state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LinkState {
    /// Receiver role, nothing outstanding
    #[default]
    Listening,
    /// Byte sent, watching for a MAX_RT edge
    AwaitingIrq {
        /// Monotonic tick at which the byte was sent
        sent_at: u32,
    },
    /// Retries exhausted on the last send
    Failed,
}

#[cfg(feature = "embedded")]
impl defmt::Format for LinkState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Listening => defmt::write!(f, "Listening"),
            Self::AwaitingIrq { sent_at } => defmt::write!(f, "AwaitingIrq(@{})", sent_at),
            Self::Failed => defmt::write!(f, "Failed"),
        }
    }
}

/// Button-triggered single byte link
#[derive(Clone, Debug)]
pub struct Link {
    state: LinkState,
    tx_byte: u8,
    window_ticks: u32,
    last_edges: u32,
    sent: u32,
    delivered: u32,
    failures: u32,
}

impl Link {
    /// Create a supervisor sending `tx_byte`
    ///
    /// A send with no IRQ edge for `window_ticks` counts as delivered.
    #[must_use]
    pub const fn new(tx_byte: u8, window_ticks: u32) -> Self {
        Self {
            state: LinkState::Listening,
            tx_byte,
            window_ticks,
            last_edges: 0,
            sent: 0,
            delivered: 0,
            failures: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> LinkState {
        self.state
    }

    /// Bytes sent so far
    #[must_use]
    pub const fn sent(&self) -> u32 {
        self.sent
    }

    /// Sends that closed their window without an edge
    #[must_use]
    pub const fn delivered(&self) -> u32 {
        self.delivered
    }

    /// Sends that ended in a MAX_RT edge
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    /// Button pressed at tick `now` with `edges` IRQ edges seen so far
    ///
    /// Ignored while a send is outstanding. Returns the new system state
    /// when it changes.
    pub fn on_press<R>(&mut self, radio: &mut R, now: u32, edges: u32) -> Option<SystemState>
    where
        R: RadioRegisters + ?Sized,
    {
        if matches!(self.state, LinkState::AwaitingIrq { .. }) {
            debug!("link busy, press ignored");
            return None;
        }

        self.last_edges = edges;
        radio.send_byte(self.tx_byte);
        self.sent = self.sent.wrapping_add(1);
        self.state = LinkState::AwaitingIrq { sent_at: now };
        info!("sent {=u8:#04x} (#{})", self.tx_byte, self.sent);
        Some(SystemState::Warning)
    }

    /// Periodic check at tick `now` with `edges` IRQ edges seen so far
    ///
    /// Returns the new system state when it changes. `Fail` holds until the
    /// next press.
    pub fn poll<R>(&mut self, radio: &mut R, now: u32, edges: u32) -> Option<SystemState>
    where
        R: RadioRegisters + ?Sized,
    {
        let fresh_edge = edges != self.last_edges;
        self.last_edges = edges;

        let LinkState::AwaitingIrq { sent_at } = self.state else {
            return None;
        };

        if fresh_edge {
            radio.listen();
            self.failures = self.failures.wrapping_add(1);
            self.state = LinkState::Failed;
            warn!("retries exhausted on #{}", self.sent);
            Some(SystemState::Fail)
        } else if now.wrapping_sub(sent_at) >= self.window_ticks {
            radio.listen();
            self.delivered = self.delivered.wrapping_add(1);
            self.state = LinkState::Listening;
            debug!("#{} delivered", self.sent);
            Some(SystemState::Normal)
        } else {
            None
        }
    }
}
