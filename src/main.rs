//! NRF24L01 Master Main Application
//!
//! Entry point for the STM32G474 board. Brings up the radio and the status
//! LED with interrupts gated, installs the interrupt contexts, starts the
//! 1 µs SysTick and then runs the button-driven link supervisor as an
//! embassy task.

#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m_rt::exception;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::gpio::{Flex, Input, Level, Output, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::mode::Blocking;
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use nrf24_firmware::drivers::nrf24l01::Nrf24l01;
use nrf24_firmware::hal::gpio::{ActiveLevel, ButtonState, PushButton, RgbLed};
use nrf24_firmware::hal::stm32::{self, RadioRawMutex, Stm32Board};
use nrf24_firmware::hal::EdgeInterrupt;
use nrf24_firmware::monitor::TickSource;
use nrf24_firmware::prelude::*;
use nrf24_firmware::radio::irq::{EdgeCounter, RadioIrq};
use nrf24_firmware::radio::link::Link;
use nrf24_firmware::radio::setup::{self, RadioLines};

type Radio = Nrf24l01<Spi<'static, Blocking>, Flex<'static>, Flex<'static>, Delay>;
type StatusLed = RgbLed<Output<'static>, Output<'static>, Output<'static>>;

/// Everything the SysTick handler touches
struct TickContext {
    source: TickSource,
    led: StatusLed,
}

static SYSTEM_STATE: SharedSystemState = SharedSystemState::new(SystemState::Normal);
static RADIO_EDGES: EdgeCounter = EdgeCounter::new();
static TICK_NOW: AtomicU32 = AtomicU32::new(0);
// Borrowed from thread mode and the radio vector, never from SysTick
static RADIO: Mutex<RadioRawMutex, RefCell<Option<Radio>>> = Mutex::new(RefCell::new(None));
// Only SysTick locks this once it runs
static TICKS: Mutex<CriticalSectionRawMutex, RefCell<Option<TickContext>>> =
    Mutex::new(RefCell::new(None));

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    stm32::disable_all();
    info!("NRF24L01 master firmware v{}", env!("CARGO_PKG_VERSION"));

    // HSI 16 MHz / 4 * 85 / 2 = 170 MHz
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL85,
            divp: None,
            divq: None,
            divr: Some(PllRDiv::DIV2),
        });
        config.rcc.sys = Sysclk::PLL1_R;
        config.rcc.boost = true;
    }
    let p = embassy_stm32::init(config);
    let Some(mut core) = cortex_m::Peripherals::take() else {
        defmt::panic!("core peripherals already taken");
    };

    info!("Peripherals initialized");

    // Indicator first so a failed radio bring-up still leaves the LED off
    let led = RgbLed::new(
        Output::new(p.PC0, Level::Low, Speed::Low),
        Output::new(p.PC2, Level::Low, Speed::Low),
        Output::new(p.PC1, Level::Low, Speed::Low),
    );

    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(SPI_FREQUENCY_HZ);
    spi_config.mode = spi::MODE_0;
    // PA5 = SCK, PA7 = MOSI, PA6 = MISO
    let spi = Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi_config);

    // Direction is set by the bring-up sequence, only preload the levels
    let mut ce = Flex::new(p.PB0);
    ce.set_low();
    let mut csn = Flex::new(p.PA4);
    csn.set_high();
    let _irq_pin = p.PC7;

    let mut radio = Nrf24l01::new(spi, ce, csn, Delay);
    let mut board = Stm32Board;
    if let Err(e) = setup::initialize(&mut board, &mut radio, RadioLines::BOARD, radio_irq, CLOCK_READY_WAIT) {
        defmt::panic!("radio bring-up failed: {}", e);
    }

    match radio.snapshot() {
        Ok(registers) => {
            for &(register, value) in &registers {
                debug!("{} = {=u8:#04x}", register, value);
            }
        }
        Err(_) => warn!("register snapshot failed"),
    }

    RADIO.lock(|cell| *cell.borrow_mut() = Some(radio));
    TICKS.lock(|cell| {
        *cell.borrow_mut() = Some(TickContext {
            source: TickSource::default(),
            led,
        });
    });

    stm32::start_systick(core.SYST, &mut core.SCB, SYSTICK_RELOAD);
    board.enable_all();
    info!("Interrupts enabled");

    let button = PushButton::new(Input::new(p.PC13, Pull::Down), ActiveLevel::High);
    spawner.spawn(link_task(button)).unwrap();

    info!("Tasks spawned, entering main loop");

    loop {
        Timer::after(Duration::from_secs(10)).await;
        info!("state {}, {} radio irqs", SYSTEM_STATE.get(), RADIO_EDGES.count());
    }
}

/// Handler registered for the radio IRQ line
fn radio_irq() {
    let mut board = Stm32Board;
    RADIO.lock(|cell| match cell.borrow_mut().as_mut() {
        Some(radio) => RadioIrq::new(pins::RADIO_IRQ, &RADIO_EDGES).on_edge(radio, &mut board),
        None => board.clear_pending(pins::RADIO_IRQ),
    });
}

/// Current monotonic tick
fn now() -> u32 {
    TICK_NOW.load(Ordering::Relaxed)
}

fn with_radio<T>(f: impl FnOnce(&mut Radio) -> Option<T>) -> Option<T> {
    RADIO.lock(|cell| cell.borrow_mut().as_mut().and_then(f))
}

fn publish(change: Option<SystemState>) {
    if let Some(state) = change {
        let previous = SYSTEM_STATE.set(state);
        info!("state {} -> {}", previous, state);
    }
}

/// Button sampling and link supervision
#[embassy_executor::task]
async fn link_task(mut button: PushButton<Input<'static>>) {
    let mut link = Link::new(TX_BYTE, TX_TIMEOUT_TICKS);
    let mut button_ticker = Ticker::every(Duration::from_millis(BUTTON_POLL_MS));
    let mut supervisor_ticker = Ticker::every(Duration::from_millis(SUPERVISOR_POLL_MS));

    loop {
        match select(button_ticker.next(), supervisor_ticker.next()).await {
            Either::First(()) => {
                if button.update() == Some(ButtonState::Pressed) {
                    let at = now();
                    publish(with_radio(|radio| link.on_press(radio, at, RADIO_EDGES.count())));
                }
            }
            Either::Second(()) => {
                let at = now();
                publish(with_radio(|radio| link.poll(radio, at, RADIO_EDGES.count())));
            }
        }
    }
}

#[interrupt]
unsafe fn EXTI9_5() {
    stm32::on_exti(5, 9);
}

#[exception]
fn SysTick() {
    TICKS.lock(|cell| {
        if let Some(ctx) = cell.borrow_mut().as_mut() {
            let state = SYSTEM_STATE.get();
            ctx.source.on_tick(state, &mut ctx.led);
            TICK_NOW.store(ctx.source.now(), Ordering::Relaxed);
        }
    });
}
