//! Radio Interrupt Handling
//!
//! The NRF24L01 pulls IRQ low for RX_DR, TX_DS or MAX_RT. STATUS cannot be
//! read reliably from inside the handler on this board, so every edge is
//! treated the same: clear all flags, drop the RX FIFO, acknowledge the
//! line. Nothing here branches on the interrupt cause.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::hal::EdgeInterrupt;
use crate::radio::RadioRegisters;
use crate::types::PinId;

/// Count of radio IRQ edges serviced, readable from any context
#[derive(Debug, Default)]
pub struct EdgeCounter(AtomicU32);

impl EdgeCounter {
    /// Start at zero
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Edges seen so far (wraps)
    pub fn count(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::Release);
    }
}

/// Service one radio interrupt edge
///
/// Afterwards the radio has no pending flags, an empty RX FIFO, and the
/// line is ready for the next falling edge. Safe to call repeatedly.
pub fn service<R, L>(radio: &mut R, line: &mut L, irq: PinId)
where
    R: RadioRegisters + ?Sized,
    L: EdgeInterrupt + ?Sized,
{
    radio.clear_all_irq();
    radio.flush_rx();
    line.clear_pending(irq);
}

/// Radio interrupt context: the line it listens on plus the edge counter
#[derive(Debug)]
pub struct RadioIrq<'a> {
    irq: PinId,
    edges: &'a EdgeCounter,
}

impl<'a> RadioIrq<'a> {
    /// Bind to an IRQ line and a counter
    #[must_use]
    pub const fn new(irq: PinId, edges: &'a EdgeCounter) -> Self {
        Self { irq, edges }
    }

    /// Line this context services
    #[must_use]
    pub const fn line(&self) -> PinId {
        self.irq
    }

    /// Handle a falling edge
    pub fn on_edge<R, L>(&self, radio: &mut R, line: &mut L)
    where
        R: RadioRegisters + ?Sized,
        L: EdgeInterrupt + ?Sized,
    {
        service(radio, line, self.irq);
        self.edges.record();
        trace!("radio irq #{}", self.edges.count());
    }
}
