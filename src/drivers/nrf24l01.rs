//! NRF24L01 Transceiver Driver
//!
//! Register-level driver for the Nordic NRF24L01(+) 2.4 GHz transceiver.
//! Only what the single supported mode needs is implemented: pipe 0,
//! fixed payload width, optional Enhanced ShockBurst auto-acknowledge.
//!
//! Every SPI transaction is framed by CSN low/high. The chip returns its
//! STATUS register as the first byte of every transaction.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::config::{nrf24, CE_PULSE_US};
use crate::radio::{RadioRegisters, Role};

/// Largest payload the chip accepts
pub const MAX_PAYLOAD_WIDTH: u8 = 32;

/// Power-down to standby settling time in microseconds (datasheet: 1.5 ms)
const POWER_UP_DELAY_US: u32 = 5_000;

/// SPI instruction set
mod cmd {
    pub const R_REGISTER: u8 = 0x00;
    pub const W_REGISTER: u8 = 0x20;
    pub const W_TX_PAYLOAD: u8 = 0xA0;
    pub const FLUSH_TX: u8 = 0xE1;
    pub const FLUSH_RX: u8 = 0xE2;
    pub const NOP: u8 = 0xFF;
}

/// CONFIG register bits
pub mod config_bits {
    /// Primary receiver
    pub const PRIM_RX: u8 = 0x01;
    /// Power up
    pub const PWR_UP: u8 = 0x02;
    /// MAX_RT does not pull IRQ low
    pub const MASK_MAX_RT: u8 = 0x10;
    /// TX_DS does not pull IRQ low
    pub const MASK_TX_DS: u8 = 0x20;
    /// RX_DR does not pull IRQ low
    pub const MASK_RX_DR: u8 = 0x40;
}

/// STATUS bits cleared by writing 1: RX_DR | TX_DS | MAX_RT
const STATUS_IRQ_MASK: u8 = 0x70;

/// Register map
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Configuration
    Config = 0x00,
    /// Auto acknowledge per pipe
    EnAa = 0x01,
    /// Enabled RX pipes
    EnRxAddr = 0x02,
    /// Address width
    SetupAw = 0x03,
    /// Automatic retransmission
    SetupRetr = 0x04,
    /// RF channel
    RfCh = 0x05,
    /// Data rate and output power
    RfSetup = 0x06,
    /// Status flags
    Status = 0x07,
    /// Lost / retransmitted packet counters
    ObserveTx = 0x08,
    /// Received power detector
    Rpd = 0x09,
    /// Pipe 0 receive address
    RxAddrP0 = 0x0A,
    /// Transmit address
    TxAddr = 0x10,
    /// Pipe 0 payload width
    RxPwP0 = 0x11,
    /// FIFO status
    FifoStatus = 0x17,
}

impl Register {
    /// 5-bit register address
    #[must_use]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Register {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Config => defmt::write!(f, "CONFIG"),
            Self::EnAa => defmt::write!(f, "EN_AA"),
            Self::EnRxAddr => defmt::write!(f, "EN_RXADDR"),
            Self::SetupAw => defmt::write!(f, "SETUP_AW"),
            Self::SetupRetr => defmt::write!(f, "SETUP_RETR"),
            Self::RfCh => defmt::write!(f, "RF_CH"),
            Self::RfSetup => defmt::write!(f, "RF_SETUP"),
            Self::Status => defmt::write!(f, "STATUS"),
            Self::ObserveTx => defmt::write!(f, "OBSERVE_TX"),
            Self::Rpd => defmt::write!(f, "RPD"),
            Self::RxAddrP0 => defmt::write!(f, "RX_ADDR_P0"),
            Self::TxAddr => defmt::write!(f, "TX_ADDR"),
            Self::RxPwP0 => defmt::write!(f, "RX_PW_P0"),
            Self::FifoStatus => defmt::write!(f, "FIFO_STATUS"),
        }
    }
}

/// Registers captured by [`Nrf24l01::snapshot`]
pub const SNAPSHOT_REGISTERS: [Register; 12] = [
    Register::Config,
    Register::EnAa,
    Register::EnRxAddr,
    Register::SetupAw,
    Register::SetupRetr,
    Register::RfCh,
    Register::RfSetup,
    Register::Status,
    Register::ObserveTx,
    Register::Rpd,
    Register::RxPwP0,
    Register::FifoStatus,
];

/// Register dump for diagnostics
pub type RegisterSnapshot = heapless::Vec<(Register, u8), 12>;

/// Decoded STATUS register
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    /// Wrap a raw STATUS value
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw value
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// RX_DR: data received
    #[must_use]
    pub const fn rx_ready(self) -> bool {
        self.0 & 0x40 != 0
    }

    /// TX_DS: data sent (and acknowledged when auto-ack is on)
    #[must_use]
    pub const fn tx_sent(self) -> bool {
        self.0 & 0x20 != 0
    }

    /// MAX_RT: retransmit limit reached
    #[must_use]
    pub const fn max_retries(self) -> bool {
        self.0 & 0x10 != 0
    }

    /// Any interrupt flag set
    #[must_use]
    pub const fn irq_pending(self) -> bool {
        self.0 & STATUS_IRQ_MASK != 0
    }

    /// Pipe holding the next RX payload, `None` when the RX FIFO is empty
    #[must_use]
    pub const fn rx_pipe(self) -> Option<u8> {
        match (self.0 >> 1) & 0x07 {
            pipe @ 0..=5 => Some(pipe),
            _ => None,
        }
    }

    /// TX FIFO full
    #[must_use]
    pub const fn tx_full(self) -> bool {
        self.0 & 0x01 != 0
    }
}

impl core::fmt::Debug for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Status")
            .field("rx_ready", &self.rx_ready())
            .field("tx_sent", &self.tx_sent())
            .field("max_retries", &self.max_retries())
            .field("rx_pipe", &self.rx_pipe())
            .field("tx_full", &self.tx_full())
            .finish()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Status(rx_dr={}, tx_ds={}, max_rt={}, tx_full={})",
            self.rx_ready(),
            self.tx_sent(),
            self.max_retries(),
            self.tx_full()
        );
    }
}

/// Driver error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<SpiE, PinE> {
    /// SPI bus error
    Spi(SpiE),
    /// CE or CSN pin error
    Pin(PinE),
}

impl<SpiE: core::fmt::Debug, PinE: core::fmt::Debug> core::fmt::Display for Error<SpiE, PinE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "spi error: {e:?}"),
            Self::Pin(e) => write!(f, "pin error: {e:?}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl<SpiE: defmt::Format, PinE: defmt::Format> defmt::Format for Error<SpiE, PinE> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Spi(e) => defmt::write!(f, "Spi({})", e),
            Self::Pin(e) => defmt::write!(f, "Pin({})", e),
        }
    }
}

type Result<T, SpiE, PinE> = core::result::Result<T, Error<SpiE, PinE>>;

/// NRF24L01 driver
pub struct Nrf24l01<SPI, CE, CSN, D> {
    spi: SPI,
    ce: CE,
    csn: CSN,
    delay: D,
    config: u8,
    role: Role,
    payload_width: u8,
    faults: u32,
}

impl<SPI, CE, CSN, D, SpiE, PinE> Nrf24l01<SPI, CE, CSN, D>
where
    SPI: SpiBus<u8, Error = SpiE>,
    CE: OutputPin<Error = PinE>,
    CSN: OutputPin<Error = PinE>,
    D: DelayNs,
{
    /// Wrap the bus and control pins; the chip is not touched
    pub fn new(spi: SPI, ce: CE, csn: CSN, delay: D) -> Self {
        Self {
            spi,
            ce,
            csn,
            delay,
            config: nrf24::CONFIG_BASE,
            role: Role::Receiver,
            payload_width: 1,
            faults: 0,
        }
    }

    /// Configure pipe 0 for the given role and payload width and power up
    ///
    /// The width is clamped to 1..=32. In receiver role CE is left high so
    /// the chip starts listening immediately.
    pub fn initialize(&mut self, role: Role, payload_width: u8, auto_ack: bool) -> Result<(), SpiE, PinE> {
        let width = payload_width.clamp(1, MAX_PAYLOAD_WIDTH);
        self.ce.set_low().map_err(Error::Pin)?;

        self.config = role_config(role);
        self.write_register(Register::Config, self.config)?;
        self.write_register(Register::EnAa, u8::from(auto_ack))?;
        self.write_register(Register::EnRxAddr, 0x01)?;
        self.write_register(Register::SetupAw, nrf24::ADDRESS_WIDTH)?;
        let retries = if auto_ack { nrf24::RETRIES } else { 0 };
        self.write_register(Register::SetupRetr, retries)?;
        self.write_register(Register::RfCh, nrf24::CHANNEL)?;
        self.write_register(Register::RfSetup, nrf24::RF_SETUP)?;
        self.write_address(Register::RxAddrP0, &nrf24::ADDRESS)?;
        self.write_address(Register::TxAddr, &nrf24::ADDRESS)?;
        self.write_register(Register::RxPwP0, width)?;

        self.delay.delay_us(POWER_UP_DELAY_US);

        self.role = role;
        self.payload_width = width;
        if role == Role::Receiver {
            self.ce.set_high().map_err(Error::Pin)?;
        }
        Ok(())
    }

    /// Discard everything in the RX FIFO
    pub fn flush_rx(&mut self) -> Result<Status, SpiE, PinE> {
        self.command(&mut [cmd::FLUSH_RX])
    }

    /// Discard everything in the TX FIFO
    pub fn flush_tx(&mut self) -> Result<Status, SpiE, PinE> {
        self.command(&mut [cmd::FLUSH_TX])
    }

    /// Clear RX_DR, TX_DS and MAX_RT in one write
    pub fn clear_all_irq(&mut self) -> Result<(), SpiE, PinE> {
        self.write_register(Register::Status, STATUS_IRQ_MASK)
    }

    /// Transmit one byte on pipe 0
    ///
    /// Switches to the transmitter role, loads the payload and pulses CE.
    /// The outcome is reported by the IRQ line.
    pub fn send_byte(&mut self, byte: u8) -> Result<(), SpiE, PinE> {
        self.ce.set_low().map_err(Error::Pin)?;
        if self.role != Role::Transmitter {
            self.config = role_config(Role::Transmitter);
            self.write_register(Register::Config, self.config)?;
            self.role = Role::Transmitter;
        }
        self.command(&mut [cmd::W_TX_PAYLOAD, byte])?;
        self.ce.set_high().map_err(Error::Pin)?;
        self.delay.delay_us(CE_PULSE_US);
        self.ce.set_low().map_err(Error::Pin)
    }

    /// Return to the receiver role with CE high
    pub fn listen(&mut self) -> Result<(), SpiE, PinE> {
        if self.role != Role::Receiver {
            self.config = role_config(Role::Receiver);
            self.write_register(Register::Config, self.config)?;
            self.role = Role::Receiver;
        }
        self.ce.set_high().map_err(Error::Pin)
    }

    /// Read STATUS with a NOP
    pub fn status(&mut self) -> Result<Status, SpiE, PinE> {
        self.command(&mut [cmd::NOP])
    }

    /// Read a single-byte register (first byte for address registers)
    pub fn read_register(&mut self, register: Register) -> Result<u8, SpiE, PinE> {
        let mut buf = [cmd::R_REGISTER | register.addr(), cmd::NOP];
        self.transfer(&mut buf)?;
        Ok(buf[1])
    }

    /// Dump the configuration registers
    pub fn snapshot(&mut self) -> Result<RegisterSnapshot, SpiE, PinE> {
        let mut dump = RegisterSnapshot::new();
        for register in SNAPSHOT_REGISTERS {
            let value = self.read_register(register)?;
            // capacity equals SNAPSHOT_REGISTERS.len()
            let _ = dump.push((register, value));
        }
        Ok(dump)
    }

    /// Current role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Configured payload width
    #[must_use]
    pub const fn payload_width(&self) -> u8 {
        self.payload_width
    }

    /// Number of bus or pin errors swallowed by the [`RadioRegisters`] interface
    #[must_use]
    pub const fn faults(&self) -> u32 {
        self.faults
    }

    /// Give back the bus, pins and delay
    pub fn release(self) -> (SPI, CE, CSN, D) {
        (self.spi, self.ce, self.csn, self.delay)
    }

    fn write_register(&mut self, register: Register, value: u8) -> Result<(), SpiE, PinE> {
        self.command(&mut [cmd::W_REGISTER | register.addr(), value])
            .map(|_| ())
    }

    fn write_address(&mut self, register: Register, address: &[u8; 5]) -> Result<(), SpiE, PinE> {
        let mut buf = [0u8; 6];
        buf[0] = cmd::W_REGISTER | register.addr();
        buf[1..].copy_from_slice(address);
        self.command(&mut buf).map(|_| ())
    }

    fn command(&mut self, buf: &mut [u8]) -> Result<Status, SpiE, PinE> {
        self.transfer(buf)?;
        Ok(Status::from_raw(buf[0]))
    }

    fn transfer(&mut self, buf: &mut [u8]) -> Result<(), SpiE, PinE> {
        self.csn.set_low().map_err(Error::Pin)?;
        let result = self
            .spi
            .transfer_in_place(buf)
            .and_then(|()| self.spi.flush())
            .map_err(Error::Spi);
        self.csn.set_high().map_err(Error::Pin)?;
        result
    }

    fn record<T>(&mut self, op: &'static str, result: Result<T, SpiE, PinE>) {
        if result.is_err() {
            self.faults = self.faults.wrapping_add(1);
            warn!("nrf24l01: {} failed ({} faults)", op, self.faults);
        }
    }
}

/// CONFIG value the driver writes for a role
#[must_use]
pub const fn role_config(role: Role) -> u8 {
    match role {
        Role::Receiver => nrf24::CONFIG_BASE | config_bits::PWR_UP | config_bits::PRIM_RX,
        Role::Transmitter => nrf24::CONFIG_BASE | config_bits::PWR_UP,
    }
}

impl<SPI, CE, CSN, D, SpiE, PinE> RadioRegisters for Nrf24l01<SPI, CE, CSN, D>
where
    SPI: SpiBus<u8, Error = SpiE>,
    CE: OutputPin<Error = PinE>,
    CSN: OutputPin<Error = PinE>,
    D: DelayNs,
{
    fn initialize(&mut self, role: Role, payload_width: u8, auto_ack: bool) {
        let result = Nrf24l01::initialize(self, role, payload_width, auto_ack);
        self.record("initialize", result);
    }

    fn flush_rx(&mut self) {
        let result = Nrf24l01::flush_rx(self);
        self.record("flush_rx", result);
    }

    fn flush_tx(&mut self) {
        let result = Nrf24l01::flush_tx(self);
        self.record("flush_tx", result);
    }

    fn clear_all_irq(&mut self) {
        let result = Nrf24l01::clear_all_irq(self);
        self.record("clear_all_irq", result);
    }

    fn send_byte(&mut self, byte: u8) {
        let result = Nrf24l01::send_byte(self, byte);
        self.record("send_byte", result);
    }

    fn listen(&mut self) {
        let result = Nrf24l01::listen(self);
        self.record("listen", result);
    }
}
