//! # Bus Transport
//!
//! The LTC230x talks over a plain two-wire bus: we write one control byte,
//! close the transmission and look at the status, then ask for two bytes
//! back. This module describes that capability as the [`Bus`] trait, and
//! provides [`HalBus`] which implements it on top of any
//! [`embedded_hal::i2c::I2c`] peripheral.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};

//
// Public Types
//

/// The outcome of closing a transmission with [`Bus::end_transmission`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransmissionStatus {
    /// Every byte was acknowledged
    Ok,
    /// The payload did not fit in the transmit buffer
    BufferOverflow,
    /// No device acknowledged the address
    AddressNack,
    /// The device rejected a data byte
    DataNack,
    /// Some other bus failure
    OtherError,
    /// The transport gave up waiting
    Timeout,
}

/// A failure reported by the bus during one phase of a transaction.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The payload did not fit in the transport's buffer
    BufferOverflow,
    /// No device acknowledged the address
    AddressNack,
    /// The device rejected a data byte
    DataNack,
    /// Some other bus failure
    OtherError,
    /// The transport gave up waiting
    Timeout,
}

/// The two-wire bus operations the LTC230x driver needs.
///
/// Writes are framed by [`Bus::begin_transmission`] and
/// [`Bus::end_transmission`], and nothing goes on the wire until the
/// transmission is ended. Reads are done by [`Bus::request_from`], after which
/// the received bytes are handed out one at a time by [`Bus::read_byte`].
pub trait Bus {
    /// Start queueing a write to the device at `address`.
    fn begin_transmission(&mut self, address: u8);

    /// Queue one byte for the current transmission.
    fn write(&mut self, byte: u8);

    /// Send the queued bytes and report how it went.
    fn end_transmission(&mut self) -> TransmissionStatus;

    /// Read `count` bytes from the device at `address`.
    fn request_from(&mut self, address: u8, count: usize) -> Result<(), TransportError>;

    /// Take the next byte received by [`Bus::request_from`].
    fn read_byte(&mut self) -> Result<u8, TransportError>;
}

/// Implements [`Bus`] on top of an `embedded-hal` I²C peripheral.
///
/// Bytes written between `begin_transmission` and `end_transmission` are
/// buffered and then sent as a single I²C write. A request is done as a
/// single I²C read into a receive buffer.
#[derive(Debug)]
pub struct HalBus<I2C> {
    i2c: I2C,
    tx_address: u8,
    tx_buffer: [u8; TX_BUFFER_LEN],
    tx_len: usize,
    tx_overflow: bool,
    rx_buffer: [u8; RX_BUFFER_LEN],
    rx_len: usize,
    rx_pos: usize,
}

//
// Public Data
//

/// How many bytes [`HalBus`] can queue in one transmission.
pub const TX_BUFFER_LEN: usize = 32;

/// How many bytes [`HalBus`] can receive in one request.
pub const RX_BUFFER_LEN: usize = 32;

//
// Public Functions
//

/// Perform one conversion-read transaction with an LTC230x.
///
/// Sends `control_byte` to `address`, and if the device accepted it, reads
/// back the 16-bit conversion word (MSB first). A failed write means we never
/// start the read.
pub fn read_word<B>(bus: &mut B, address: u8, control_byte: u8) -> Result<u16, TransportError>
where
    B: Bus + ?Sized,
{
    bus.begin_transmission(address);
    bus.write(control_byte);
    if let Err(e) = bus.end_transmission().into_result() {
        #[cfg(feature = "defmt")]
        defmt::warn!("LTC230x 0x{:02x} rejected command: {}", address, e);
        return Err(e);
    }

    bus.request_from(address, 2)?;
    let high = bus.read_byte()?;
    let low = bus.read_byte()?;
    let word = u16::from_be_bytes([high, low]);
    #[cfg(feature = "defmt")]
    defmt::debug!(
        "LTC230x 0x{:02x} command 0x{:02x} returned 0x{:04x}",
        address,
        control_byte,
        word
    );
    Ok(word)
}

//
// impls on Public Types
//

impl TransmissionStatus {
    /// Convert to a `Result`, so a failed status can be propagated with `?`.
    pub fn into_result(self) -> Result<(), TransportError> {
        match self {
            TransmissionStatus::Ok => Ok(()),
            TransmissionStatus::BufferOverflow => Err(TransportError::BufferOverflow),
            TransmissionStatus::AddressNack => Err(TransportError::AddressNack),
            TransmissionStatus::DataNack => Err(TransportError::DataNack),
            TransmissionStatus::OtherError => Err(TransportError::OtherError),
            TransmissionStatus::Timeout => Err(TransportError::Timeout),
        }
    }
}

/// Decodes the numeric status codes used by Arduino-style `Wire` transports.
///
/// Unknown codes are treated as [`TransmissionStatus::OtherError`].
impl From<u8> for TransmissionStatus {
    fn from(code: u8) -> TransmissionStatus {
        match code {
            0 => TransmissionStatus::Ok,
            1 => TransmissionStatus::BufferOverflow,
            2 => TransmissionStatus::AddressNack,
            3 => TransmissionStatus::DataNack,
            5 => TransmissionStatus::Timeout,
            _ => TransmissionStatus::OtherError,
        }
    }
}

impl From<TransportError> for TransmissionStatus {
    fn from(e: TransportError) -> TransmissionStatus {
        match e {
            TransportError::BufferOverflow => TransmissionStatus::BufferOverflow,
            TransportError::AddressNack => TransmissionStatus::AddressNack,
            TransportError::DataNack => TransmissionStatus::DataNack,
            TransportError::OtherError => TransmissionStatus::OtherError,
            TransportError::Timeout => TransmissionStatus::Timeout,
        }
    }
}

impl From<ErrorKind> for TransportError {
    fn from(kind: ErrorKind) -> TransportError {
        match kind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => TransportError::AddressNack,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => TransportError::DataNack,
            _ => TransportError::OtherError,
        }
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            TransportError::BufferOverflow => write!(f, "data too long for transmit buffer"),
            TransportError::AddressNack => write!(f, "NACK on transmit of address"),
            TransportError::DataNack => write!(f, "NACK on transmit of data"),
            TransportError::OtherError => write!(f, "other bus error"),
            TransportError::Timeout => write!(f, "bus timeout"),
        }
    }
}

impl<I2C> HalBus<I2C>
where
    I2C: I2c,
{
    /// Wrap an I²C peripheral.
    pub fn new(i2c: I2C) -> HalBus<I2C> {
        HalBus {
            i2c,
            tx_address: 0,
            tx_buffer: [0; TX_BUFFER_LEN],
            tx_len: 0,
            tx_overflow: false,
            rx_buffer: [0; RX_BUFFER_LEN],
            rx_len: 0,
            rx_pos: 0,
        }
    }

    /// Destroy the wrapper and return the I²C peripheral.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Bus for HalBus<I2C>
where
    I2C: I2c,
{
    fn begin_transmission(&mut self, address: u8) {
        self.tx_address = address;
        self.tx_len = 0;
        self.tx_overflow = false;
    }

    fn write(&mut self, byte: u8) {
        match self.tx_buffer.get_mut(self.tx_len) {
            Some(slot) => {
                *slot = byte;
                self.tx_len += 1;
            }
            None => self.tx_overflow = true,
        }
    }

    fn end_transmission(&mut self) -> TransmissionStatus {
        let status = if self.tx_overflow {
            TransmissionStatus::BufferOverflow
        } else {
            match self
                .i2c
                .write(self.tx_address, &self.tx_buffer[..self.tx_len])
            {
                Ok(()) => TransmissionStatus::Ok,
                Err(e) => TransportError::from(e.kind()).into(),
            }
        };
        self.tx_len = 0;
        self.tx_overflow = false;
        status
    }

    fn request_from(&mut self, address: u8, count: usize) -> Result<(), TransportError> {
        // Anything left over from a previous request is gone
        self.rx_len = 0;
        self.rx_pos = 0;
        if count > RX_BUFFER_LEN {
            return Err(TransportError::BufferOverflow);
        }
        self.i2c
            .read(address, &mut self.rx_buffer[..count])
            .map_err(|e| TransportError::from(e.kind()))?;
        self.rx_len = count;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let byte = self.rx_buffer[..self.rx_len]
            .get(self.rx_pos)
            .copied()
            .ok_or(TransportError::OtherError)?;
        self.rx_pos += 1;
        Ok(byte)
    }
}


//
// End of file
//
