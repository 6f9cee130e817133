//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the NRF24L01 master board.
//! All pin mappings, clock frequencies, timing and radio parameters are
//! centralized here.

use crate::hal::ReadyWait;

/// System clock frequency (STM32G474 @ 170MHz)
pub const SYSTEM_CLOCK_HZ: u32 = 170_000_000;

/// Tick period of the SysTick interrupt in microseconds
pub const TICK_PERIOD_US: u32 = 1;

/// Ticks per second
pub const TICKS_PER_SECOND: u32 = 1_000_000 / TICK_PERIOD_US;

/// Ticks between two monitor updates (0.1 s)
pub const MONITOR_PERIOD_TICKS: u32 = 100_000;

/// SPI bus frequency for the NRF24L01 (mode 0, 8 bit)
pub const SPI_FREQUENCY_HZ: u32 = 2_000_000;

/// Payload width used on pipe 0
pub const PAYLOAD_WIDTH: u8 = 1;

/// Byte sent when the button is pressed
pub const TX_BYTE: u8 = 0x01;

/// Enhanced ShockBurst (auto acknowledge) enabled
pub const AUTO_ACK: bool = true;

/// Window after a send in which a MAX_RT edge means failure (50 ms)
///
/// TX_DS is masked, so a send that stays silent this long was delivered.
pub const TX_TIMEOUT_TICKS: u32 = 50_000;

/// CE high pulse that starts a transmission, must be at least 10us
pub const CE_PULSE_US: u32 = 15;

/// Button sampling period in milliseconds
pub const BUTTON_POLL_MS: u64 = 5;

/// Consecutive equal samples before a button level is accepted
pub const BUTTON_DEBOUNCE_SAMPLES: u8 = 3;

/// Link supervisor polling period in milliseconds
pub const SUPERVISOR_POLL_MS: u64 = 10;

/// Clock-ready polling policy used during radio bring-up
pub const CLOCK_READY_WAIT: ReadyWait = ReadyWait::Unbounded;

/// SysTick reload value for a given core clock and tick period
#[must_use]
pub const fn systick_reload(clock_hz: u32, period_us: u32) -> u32 {
    (clock_hz / 1_000_000) * period_us - 1
}

/// SysTick reload value for the configured tick
pub const SYSTICK_RELOAD: u32 = systick_reload(SYSTEM_CLOCK_HZ, TICK_PERIOD_US);

/// NRF24L01 register defaults
pub mod nrf24 {
    //! Values written during radio initialization

    /// CONFIG base value: CRC enabled, TX_DS interrupt masked
    ///
    /// TX_DS cannot be read back reliably from inside the IRQ handler on this
    /// board, so the source is masked instead of being handled.
    pub const CONFIG_BASE: u8 = 0x28;

    /// SETUP_AW: 5 byte addresses
    pub const ADDRESS_WIDTH: u8 = 0x03;

    /// SETUP_RETR: 250us delay, 3 retransmits
    pub const RETRIES: u8 = 0x03;

    /// RF_CH: 2402 MHz
    pub const CHANNEL: u8 = 0x02;

    /// RF_SETUP: 2 Mbps, 0 dBm, LNA gain
    pub const RF_SETUP: u8 = 0x0F;

    /// Pipe 0 / TX address
    pub const ADDRESS: [u8; 5] = [0xE7; 5];
}

/// Raw NVIC priorities (upper nibble, lower value is more urgent)
pub mod priority {
    //! Interrupt priorities and lock ceilings as written to the core

    /// Implemented priority bits on STM32G4
    pub const BITS: u8 = 4;

    /// SysTick timebase
    pub const TICK: u8 = 0x00;

    /// Radio IRQ line (EXTI)
    pub const RADIO: u8 = 1 << (8 - BITS);

    /// BASEPRI raised while the radio driver is borrowed
    ///
    /// Blocks the radio vector and leaves the tick running.
    pub const RADIO_LOCK_CEILING: u8 = RADIO;
}

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the board wiring

    use crate::types::{PinId, Port};

    /// NRF24L01 chip enable
    pub const RADIO_CE: PinId = PinId::new(Port::B, 0);

    /// NRF24L01 chip select (active low)
    pub const RADIO_CSN: PinId = PinId::new(Port::A, 4);

    /// NRF24L01 interrupt request (active low)
    pub const RADIO_IRQ: PinId = PinId::new(Port::C, 7);

    /// SPI1 SCK
    pub const SPI_SCK: &str = "PA5";

    /// SPI1 MISO
    pub const SPI_MISO: &str = "PA6";

    /// SPI1 MOSI
    pub const SPI_MOSI: &str = "PA7";

    /// Indicator red channel
    pub const LED_RED: PinId = PinId::new(Port::C, 0);

    /// Indicator blue channel
    pub const LED_BLUE: PinId = PinId::new(Port::C, 1);

    /// Indicator green channel
    pub const LED_GREEN: PinId = PinId::new(Port::C, 2);

    /// User button (active high on the Nucleo board)
    pub const BUTTON: PinId = PinId::new(Port::C, 13);
}
