//! Interrupt Dispatch Model
//!
//! Single-threaded model of the two interrupt sources. Each source is an
//! event with a fixed priority; pending events are serviced highest
//! priority first and every handler runs to completion. Like an NVIC
//! pending bit, pending a source twice before it runs services it once.
//!
//! The tick outranks the radio so a radio edge never delays the 1 µs
//! timebase by more than one handler run.

use crate::hal::{EdgeInterrupt, IndicatorPort};
use crate::monitor::{IndicatorAction, TickSource};
use crate::radio::irq::RadioIrq;
use crate::radio::RadioRegisters;
use crate::types::SharedSystemState;

/// Interrupt sources
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// 1 µs timer period
    Tick,
    /// Falling edge on the radio IRQ line
    Radio,
}

impl Interrupt {
    /// Every source, highest priority first
    pub const ALL: [Self; 2] = [Self::Tick, Self::Radio];

    /// Priority level, lower is more urgent
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Tick => 0,
            Self::Radio => 1,
        }
    }

    const fn bit(self) -> u8 {
        1 << self.priority()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Interrupt {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Tick => defmt::write!(f, "Tick"),
            Self::Radio => defmt::write!(f, "Radio"),
        }
    }
}

/// Owns everything both handlers touch and runs them in priority order
pub struct Dispatcher<'a, R, L, I> {
    ticks: TickSource,
    radio: R,
    line: L,
    indicator: I,
    irq: RadioIrq<'a>,
    state: &'a SharedSystemState,
    pending: u8,
    last_action: Option<IndicatorAction>,
}

impl<'a, R, L, I> Dispatcher<'a, R, L, I>
where
    R: RadioRegisters,
    L: EdgeInterrupt,
    I: IndicatorPort,
{
    /// Assemble the dispatcher
    pub fn new(
        ticks: TickSource,
        radio: R,
        line: L,
        indicator: I,
        irq: RadioIrq<'a>,
        state: &'a SharedSystemState,
    ) -> Self {
        Self {
            ticks,
            radio,
            line,
            indicator,
            irq,
            state,
            pending: 0,
            last_action: None,
        }
    }

    /// Mark a source pending
    pub fn pend(&mut self, interrupt: Interrupt) {
        self.pending |= interrupt.bit();
    }

    /// Whether a source is waiting to be serviced
    #[must_use]
    pub const fn is_pending(&self, interrupt: Interrupt) -> bool {
        self.pending & interrupt.bit() != 0
    }

    /// Highest priority pending source
    #[must_use]
    pub fn next_pending(&self) -> Option<Interrupt> {
        Interrupt::ALL.into_iter().find(|i| self.is_pending(*i))
    }

    /// Service every pending source, highest priority first
    ///
    /// Returns the sources in the order they ran.
    pub fn service(&mut self) -> heapless::Vec<Interrupt, 2> {
        let mut order = heapless::Vec::new();
        while let Some(interrupt) = self.next_pending() {
            self.pending &= !interrupt.bit();
            self.run(interrupt);
            // at most one entry per source
            let _ = order.push(interrupt);
        }
        order
    }

    /// Pend one source and service everything pending
    pub fn dispatch(&mut self, interrupt: Interrupt) -> heapless::Vec<Interrupt, 2> {
        self.pend(interrupt);
        self.service()
    }

    fn run(&mut self, interrupt: Interrupt) {
        match interrupt {
            Interrupt::Tick => {
                let state = self.state.get();
                if let Some(action) = self.ticks.on_tick(state, &mut self.indicator) {
                    self.last_action = Some(action);
                }
            }
            Interrupt::Radio => self.irq.on_edge(&mut self.radio, &mut self.line),
        }
    }

    /// Tick counters
    #[must_use]
    pub const fn ticks(&self) -> &TickSource {
        &self.ticks
    }

    /// The radio
    #[must_use]
    pub const fn radio(&self) -> &R {
        &self.radio
    }

    /// Mutable access to the radio (thread-mode operations)
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// The IRQ line collaborator
    #[must_use]
    pub const fn line(&self) -> &L {
        &self.line
    }

    /// The status indicator
    #[must_use]
    pub const fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Most recent monitor action
    #[must_use]
    pub const fn last_action(&self) -> Option<IndicatorAction> {
        self.last_action
    }
}
