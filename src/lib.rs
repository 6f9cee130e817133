//! NRF24L01 Master Firmware Library
//!
//! Core of an STM32G474 board that drives an NRF24L01 2.4 GHz transceiver
//! over SPI and reports link health on an RGB status LED. Two interrupt
//! sources do all the work: a 1 µs SysTick that drives the monitor, and a
//! falling edge on the radio IRQ line.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Link supervisor (button)  │  Status monitor (LED)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    INTERRUPT LAYER                           │
//! │  SysTick → TickSource      │  EXTI → RadioIrq                │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / DRIVER LAYER                         │
//! │  Board traits  │  STM32 registers  │  NRF24L01 over SPI      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │           embassy-rs (async/await executor)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Hardware behind traits**: the radio core only sees [`hal`] traits and
//!   [`radio::RadioRegisters`], so every sequence runs on host fakes
//! - **No unsafe in application code**: register access is confined to
//!   `hal::stm32`
//! - **Lock-free shared state**: the system state and the IRQ edge counter are
//!   atomics, readable from any context
//! - **Tick never waits**: the radio driver is locked with a BASEPRI ceiling
//!   below SysTick, never by masking every interrupt

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Board traits, GPIO adapters and the STM32G474 implementation.
pub mod hal;

/// Peripheral Drivers
///
/// Register-level driver for the NRF24L01 transceiver.
pub mod drivers;

/// Radio Control Logic
///
/// Bring-up, interrupt servicing and the link supervisor.
pub mod radio;

/// Status Monitor
///
/// Tick source and LED indicator rendering of the system state.
pub mod monitor;

/// Interrupt dispatch model used to exercise handler interplay on the host
pub mod dispatch;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    // Common traits
    pub use crate::hal::{GlobalInterrupts, IndicatorPort};
    pub use crate::radio::RadioRegisters;
    pub use embedded_hal::digital::OutputPin;

    // Embassy
    pub use embassy_time::{Duration, Instant, Ticker, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
