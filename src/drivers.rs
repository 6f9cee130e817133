//! Peripheral Drivers
//!
//! Drivers for the external ICs on the board. They are generic over the
//! `embedded-hal` traits and know nothing about the MCU.

pub mod nrf24l01;
