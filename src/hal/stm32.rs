//! STM32G474 Board Support
//!
//! Implements the HAL traits on raw peripheral registers (RCC, GPIO, SYSCFG,
//! EXTI) through the embassy-stm32 PAC, and starts the SysTick timebase.
//! EXTI vectors are not bound by embassy here: the application forwards its
//! vectors to [`on_exti`], which calls whatever handler was registered for
//! the pending line.

#![allow(unsafe_code)]

use core::cell::Cell;

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{SCB, SYST};
use cortex_m::register::{basepri, basepri_max};
use critical_section::Mutex;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::pac;
use embassy_stm32::pac::gpio::vals;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::priority;
use crate::hal::{is_masked, ClockControl, EdgeInterrupt, GlobalInterrupts, IrqHandler, PinControl};
use crate::types::{Edge, PinId, Port};

const _: () = assert!(is_masked(priority::RADIO_LOCK_CEILING, priority::RADIO));
const _: () = assert!(!is_masked(priority::RADIO_LOCK_CEILING, priority::TICK));

/// Raw mutex that raises BASEPRI to `CEILING` instead of masking everything
///
/// Interrupts more urgent than the ceiling keep running while the lock is
/// held, so a long SPI transaction under the lock never stalls SysTick.
pub struct CeilingRawMutex<const CEILING: u8>;

// SAFETY: single core; every context that can touch the protected data runs
// at or below the ceiling, so raising BASEPRI excludes all of them.
unsafe impl<const CEILING: u8> RawMutex for CeilingRawMutex<CEILING> {
    const INIT: Self = Self;

    fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let previous = basepri::read();
        basepri_max::write(CEILING);
        let result = f();
        // SAFETY: restores the value read on entry, nested locks unwind in order.
        unsafe { basepri::write(previous) };
        result
    }
}

/// Lock for data shared with the radio IRQ handler
pub type RadioRawMutex = CeilingRawMutex<{ priority::RADIO_LOCK_CEILING }>;

static HANDLERS: Mutex<Cell<[Option<IrqHandler>; 16]>> = Mutex::new(Cell::new([None; 16]));

/// STM32G474 board; all state lives in peripheral registers
#[derive(Clone, Copy, Debug, Default)]
pub struct Stm32Board;

fn gpio(port: Port) -> pac::gpio::Gpio {
    match port {
        Port::A => pac::GPIOA,
        Port::B => pac::GPIOB,
        Port::C => pac::GPIOC,
        Port::D => pac::GPIOD,
        Port::E => pac::GPIOE,
        Port::F => pac::GPIOF,
        Port::G => pac::GPIOG,
    }
}

fn exti_vector(line: usize) -> pac::Interrupt {
    match line {
        0 => pac::Interrupt::EXTI0,
        1 => pac::Interrupt::EXTI1,
        2 => pac::Interrupt::EXTI2,
        3 => pac::Interrupt::EXTI3,
        4 => pac::Interrupt::EXTI4,
        5..=9 => pac::Interrupt::EXTI9_5,
        _ => pac::Interrupt::EXTI15_10,
    }
}

impl ClockControl for Stm32Board {
    fn is_ready(&mut self, port: Port) -> bool {
        let enr = pac::RCC.ahb2enr().read();
        match port {
            Port::A => enr.gpioaen(),
            Port::B => enr.gpioben(),
            Port::C => enr.gpiocen(),
            Port::D => enr.gpioden(),
            Port::E => enr.gpioeen(),
            Port::F => enr.gpiofen(),
            Port::G => enr.gpiogen(),
        }
    }

    fn enable(&mut self, port: Port) {
        pac::RCC.ahb2enr().modify(|w| match port {
            Port::A => w.set_gpioaen(true),
            Port::B => w.set_gpioben(true),
            Port::C => w.set_gpiocen(true),
            Port::D => w.set_gpioden(true),
            Port::E => w.set_gpioeen(true),
            Port::F => w.set_gpiofen(true),
            Port::G => w.set_gpiogen(true),
        });
    }
}

impl PinControl for Stm32Board {
    fn make_output(&mut self, pin: PinId) {
        let regs = gpio(pin.port());
        let n = usize::from(pin.pin());
        regs.otyper().modify(|w| w.set_ot(n, vals::Ot::PUSH_PULL));
        regs.ospeedr().modify(|w| w.set_ospeedr(n, vals::Ospeedr::VERY_HIGH_SPEED));
        regs.moder().modify(|w| w.set_moder(n, vals::Moder::OUTPUT));
    }

    fn make_input(&mut self, pin: PinId) {
        let regs = gpio(pin.port());
        let n = usize::from(pin.pin());
        // IRQ is open-drain on the radio side
        regs.pupdr().modify(|w| w.set_pupdr(n, vals::Pupdr::PULL_UP));
        regs.moder().modify(|w| w.set_moder(n, vals::Moder::INPUT));
    }
}

impl EdgeInterrupt for Stm32Board {
    fn set_edge(&mut self, pin: PinId, edge: Edge) {
        let line = usize::from(pin.pin());
        pac::RCC.apb2enr().modify(|w| w.set_syscfgen(true));
        pac::SYSCFG
            .exticr(line / 4)
            .modify(|w| w.set_exti(line % 4, pin.port().index()));
        pac::EXTI.rtsr(0).modify(|w| w.set_line(line, edge.rising()));
        pac::EXTI.ftsr(0).modify(|w| w.set_line(line, edge.falling()));
    }

    fn register(&mut self, pin: PinId, handler: IrqHandler) {
        let line = usize::from(pin.pin());
        critical_section::with(|cs| {
            let cell = HANDLERS.borrow(cs);
            let mut table = cell.get();
            table[line] = Some(handler);
            cell.set(table);
        });
    }

    fn enable_line(&mut self, pin: PinId) {
        let line = usize::from(pin.pin());
        pac::EXTI.pr(0).write(|w| w.set_line(line, true));
        pac::EXTI.imr(0).modify(|w| w.set_line(line, true));

        let vector = exti_vector(line);
        vector.set_priority(Priority::from(priority::RADIO));
        vector.unpend();
        // SAFETY: the handler table is filled before the vector is unmasked and
        // the vector only reads it inside a critical section.
        unsafe { vector.enable() };
    }

    fn clear_pending(&mut self, pin: PinId) {
        pac::EXTI.pr(0).write(|w| w.set_line(usize::from(pin.pin()), true));
    }
}

impl GlobalInterrupts for Stm32Board {
    fn enable_all(&mut self) {
        // SAFETY: called once from thread mode after every shared context is installed.
        unsafe { cortex_m::interrupt::enable() };
    }
}

/// Close the global interrupt gate
pub fn disable_all() {
    cortex_m::interrupt::disable();
}

/// Run the registered handlers for every pending line in `first..=last`
///
/// Lines without a handler are acknowledged so they cannot storm.
pub fn on_exti(first: usize, last: usize) {
    let pending = pac::EXTI.pr(0).read();
    let handlers = critical_section::with(|cs| HANDLERS.borrow(cs).get());

    for line in first..=last {
        if !pending.line(line) {
            continue;
        }
        match handlers[line] {
            Some(handler) => handler(),
            None => pac::EXTI.pr(0).write(|w| w.set_line(line, true)),
        }
    }
}

/// Start SysTick from the core clock with the given reload value
///
/// SysTick gets the highest priority and sits above every lock ceiling, so
/// the tick count stays exact.
pub fn start_systick(mut syst: SYST, scb: &mut SCB, reload: u32) {
    // SAFETY: priorities are set before the global gate opens.
    unsafe { scb.set_priority(SystemHandler::SysTick, priority::TICK) };

    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(reload);
    syst.clear_current();
    syst.enable_interrupt();
    syst.enable_counter();
    info!("systick running, reload {}", reload);
}
