//! # LTC230x Driver
//!
//! This is a driver for the Analog Devices (formerly Linear Technology)
//! LTC2301, LTC2305 and LTC2309 12-bit successive-approximation ADCs.
//!
//! The LTC230x has no registers. Instead, every conversion is started by
//! writing a single *control byte* over I²C, which selects:
//!
//! * which of the eight inputs (or pairs of inputs) feed the converter
//! * whether the result is unipolar or bipolar
//! * whether the chip goes to sleep between conversions
//!
//! The chip then returns a 16-bit word, MSB first, containing the 12-bit
//! result in the upper bits.
//!
//! The [`Ltc230x`] object caches the control byte fields, borrows a [`Bus`]
//! and turns all of that into [`Ltc230x::read_raw`], [`Ltc230x::read`] and
//! [`Ltc230x::read_voltage`]. Changing a setting does not touch the bus; it is
//! used for the next read.
//!
//! # Example
//!
//! ```rust
//! # use ltc230x::{Bus, TransmissionStatus, TransportError};
//! # struct Wire;
//! # impl Bus for Wire {
//! #     fn begin_transmission(&mut self, _address: u8) {}
//! #     fn write(&mut self, _byte: u8) {}
//! #     fn end_transmission(&mut self) -> TransmissionStatus {
//! #         TransmissionStatus::Ok
//! #     }
//! #     fn request_from(&mut self, _address: u8, _count: usize) -> Result<(), TransportError> {
//! #         Ok(())
//! #     }
//! #     fn read_byte(&mut self) -> Result<u8, TransportError> {
//! #         Ok(0x40)
//! #     }
//! # }
//! # let mut wire = Wire;
//! let mut adc = ltc230x::Ltc230x::new();
//! adc.begin(&mut wire, ltc230x::BusAddress::LowLow);
//! adc.set_channel(ltc230x::Channel::P3Com);
//! adc.set_polarity_mode(ltc230x::Polarity::Unipolar);
//! match adc.read_voltage() {
//!     Ok(volts) => {
//!         // Use the reading
//!     }
//!     Err(e) => {
//!         // ADC didn't respond
//!     }
//! }
//! ```
//!
//! If you have an `embedded-hal` I²C peripheral rather than your own [`Bus`],
//! wrap it in a [`HalBus`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]

mod bus;

pub use bus::{
    read_word, Bus, HalBus, TransmissionStatus, TransportError, RX_BUFFER_LEN, TX_BUFFER_LEN,
};

//
// Public Types
//

/// The LTC230x has one of nine I²C addresses, depending on whether the AD1
/// and AD0 pins are tied low, tied high or left floating. It also answers to
/// a global address shared by every LTC230x on the bus.
///
/// Variants are named AD1 first, then AD0.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum BusAddress {
    /// AD1 low, AD0 low
    LowLow = 0x08,
    /// AD1 low, AD0 floating
    LowFloat = 0x09,
    /// AD1 low, AD0 high
    LowHigh = 0x0A,
    /// AD1 floating, AD0 high
    FloatHigh = 0x0B,
    /// AD1 floating, AD0 floating
    FloatFloat = 0x18,
    /// AD1 floating, AD0 low
    FloatLow = 0x19,
    /// AD1 high, AD0 low
    HighLow = 0x1A,
    /// AD1 high, AD0 floating
    HighFloat = 0x1B,
    /// AD1 high, AD0 high
    HighHigh = 0x28,
    /// The global address, which every LTC230x responds to
    Global = GLOBAL_ADDRESS,
}

/// How an address pin (AD0 or AD1) is strapped.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pin {
    /// Tied to ground
    Low,
    /// Left unconnected
    Float,
    /// Tied to VCC
    High,
}

/// Selects which inputs feed the converter.
///
/// `PxNy` measures input `x` against input `y` (differential), and `PxCom`
/// measures input `x` against the COM pin (single-ended). These are the S/D,
/// O/S, S1 and S0 bits of the control byte.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Channel {
    /// CH0 positive, CH1 negative. The power-on default.
    #[default]
    P0N1 = 0x00,
    /// CH2 positive, CH3 negative
    P2N3 = 0x10,
    /// CH4 positive, CH5 negative
    P4N5 = 0x20,
    /// CH6 positive, CH7 negative
    P6N7 = 0x30,
    /// CH0 negative, CH1 positive
    N0P1 = 0x40,
    /// CH2 negative, CH3 positive
    N2P3 = 0x50,
    /// CH4 negative, CH5 positive
    N4P5 = 0x60,
    /// CH6 negative, CH7 positive
    N6P7 = 0x70,
    /// CH0 against COM
    P0Com = 0x80,
    /// CH1 against COM
    P1Com = 0x90,
    /// CH2 against COM
    P2Com = 0xA0,
    /// CH3 against COM
    P3Com = 0xB0,
    /// CH4 against COM
    P4Com = 0xC0,
    /// CH5 against COM
    P5Com = 0xD0,
    /// CH6 against COM
    P6Com = 0xE0,
    /// CH7 against COM
    P7Com = 0xF0,
}

/// Whether the converter reads 0..+FS or -FS..+FS. This is the UNI bit.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Polarity {
    /// Two's complement output. The power-on default.
    #[default]
    Bipolar = 0x00,
    /// Straight binary output
    Unipolar = 0x08,
}

/// Whether the chip powers down after a conversion. This is the SLP bit.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SleepMode {
    /// Stay awake. The power-on default.
    #[default]
    Wake = 0x00,
    /// Sleep until the next control byte
    Sleep = 0x04,
}

/// Errors from reading the LTC230x.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bus reported a failure
    Transport(TransportError),
    /// [`Ltc230x::begin`] hasn't been called
    NotInitialized,
}

/// Represents the state of one LTC230x chip.
///
/// The bus is borrowed, not owned, so the caller decides how long it lives
/// and gets it back with [`Ltc230x::release`].
#[derive(Debug)]
pub struct Ltc230x<'a, B>
where
    B: Bus + ?Sized,
{
    bus: Option<&'a mut B>,
    address: Option<BusAddress>,
    channel: Channel,
    polarity: Polarity,
    sleep: SleepMode,
}

//
// Public Data
//

/// The I²C address every LTC230x responds to.
pub const GLOBAL_ADDRESS: u8 = 0x6B;

/// The full-scale span used to scale a conversion result, in volts.
pub const FULL_SCALE_VOLTS: f32 = 4.096;

/// The value of one LSB of a conversion result, in volts.
pub const LSB_VOLTS: f32 = FULL_SCALE_VOLTS / 4096.0;

//
// Public Functions
//

/// Build the control byte that starts a conversion.
///
/// The bottom two bits are always zero.
pub const fn build_control_byte(channel: Channel, polarity: Polarity, sleep: SleepMode) -> u8 {
    channel as u8 | polarity as u8 | sleep as u8
}

/// Convert a raw conversion word into a signed 12-bit sample.
///
/// The 12-bit result sits in bits 15..4, so an arithmetic shift drops the
/// padding and keeps the sign.
pub const fn decode_raw_to_signed(raw: u16) -> i16 {
    (raw as i16) >> 4
}

/// Convert a signed 12-bit sample into volts.
pub fn decode_signed_to_voltage(sample: i16) -> f32 {
    f32::from(sample) * LSB_VOLTS
}

//
// impls on Public Types
//

impl From<BusAddress> for u8 {
    fn from(addr: BusAddress) -> u8 {
        addr as u8
    }
}

impl BusAddress {
    /// Work out the bus address from how the AD1 and AD0 pins are strapped.
    pub const fn from_pins(ad1: Pin, ad0: Pin) -> BusAddress {
        match (ad1, ad0) {
            (Pin::Low, Pin::Low) => BusAddress::LowLow,
            (Pin::Low, Pin::Float) => BusAddress::LowFloat,
            (Pin::Low, Pin::High) => BusAddress::LowHigh,
            (Pin::Float, Pin::High) => BusAddress::FloatHigh,
            (Pin::Float, Pin::Float) => BusAddress::FloatFloat,
            (Pin::Float, Pin::Low) => BusAddress::FloatLow,
            (Pin::High, Pin::Low) => BusAddress::HighLow,
            (Pin::High, Pin::Float) => BusAddress::HighFloat,
            (Pin::High, Pin::High) => BusAddress::HighHigh,
        }
    }
}

impl Channel {
    /// Iterate over all sixteen input selections.
    pub fn all() -> impl Iterator<Item = Channel> {
        [
            Channel::P0N1,
            Channel::P2N3,
            Channel::P4N5,
            Channel::P6N7,
            Channel::N0P1,
            Channel::N2P3,
            Channel::N4P5,
            Channel::N6P7,
            Channel::P0Com,
            Channel::P1Com,
            Channel::P2Com,
            Channel::P3Com,
            Channel::P4Com,
            Channel::P5Com,
            Channel::P6Com,
            Channel::P7Com,
        ]
        .into_iter()
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Error {
        Error::Transport(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "I²C error: {}", e),
            Error::NotInitialized => write!(f, "LTC230x used before begin()"),
        }
    }
}

impl<'a, B> Ltc230x<'a, B>
where
    B: Bus + ?Sized,
{
    /// Create a new LTC230x proxy object.
    ///
    /// The object has no bus and no address until you call
    /// [`Ltc230x::begin`]. The control byte fields start at the chip's
    /// power-on defaults.
    pub const fn new() -> Ltc230x<'a, B> {
        Ltc230x {
            bus: None,
            address: None,
            channel: Channel::P0N1,
            polarity: Polarity::Bipolar,
            sleep: SleepMode::Wake,
        }
    }

    /// Bind the bus and set the chip's address.
    ///
    /// Must be called before any read.
    pub fn begin(&mut self, bus: &'a mut B, address: BusAddress) {
        self.bus = Some(bus);
        self.address = Some(address);
    }

    /// Give back the bus.
    ///
    /// The object is left as if [`Ltc230x::begin`] had never been called.
    pub fn release(&mut self) -> Option<&'a mut B> {
        self.address = None;
        self.bus.take()
    }

    /// Has [`Ltc230x::begin`] been called?
    pub fn is_initialized(&self) -> bool {
        self.bus.is_some() && self.address.is_some()
    }

    /// Set the I²C address used for the next read.
    pub fn set_address(&mut self, address: BusAddress) {
        self.address = Some(address);
    }

    /// Get the I²C address, if one has been set.
    pub fn address(&self) -> Option<BusAddress> {
        self.address
    }

    /// Select the inputs for the next conversion.
    pub fn set_channel(&mut self, channel: Channel) {
        self.channel = channel;
    }

    /// Get the selected inputs.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Select unipolar or bipolar conversion.
    pub fn set_polarity_mode(&mut self, polarity: Polarity) {
        self.polarity = polarity;
    }

    /// Get whether conversions are unipolar or bipolar.
    pub fn polarity_mode(&self) -> Polarity {
        self.polarity
    }

    /// Select whether the chip sleeps after the next conversion.
    pub fn set_sleep_mode(&mut self, sleep: SleepMode) {
        self.sleep = sleep;
    }

    /// Get the sleep mode.
    pub fn sleep_mode(&self) -> SleepMode {
        self.sleep
    }

    /// The control byte the next read will send.
    pub fn control_byte(&self) -> u8 {
        build_control_byte(self.channel, self.polarity, self.sleep)
    }

    /// Run a conversion and return the 16-bit word exactly as the chip sent
    /// it.
    pub fn read_raw(&mut self) -> Result<u16, Error> {
        let control_byte = self.control_byte();
        let (bus, address) = match (self.bus.as_deref_mut(), self.address) {
            (Some(bus), Some(address)) => (bus, address),
            _ => return Err(Error::NotInitialized),
        };
        let word = read_word(bus, address.into(), control_byte)?;
        Ok(word)
    }

    /// Run a conversion and return the signed 12-bit result.
    pub fn read(&mut self) -> Result<i16, Error> {
        self.read_raw().map(decode_raw_to_signed)
    }

    /// Run a conversion and return the result in volts.
    pub fn read_voltage(&mut self) -> Result<f32, Error> {
        self.read().map(decode_signed_to_voltage)
    }
}

impl<'a, B> Default for Ltc230x<'a, B>
where
    B: Bus + ?Sized,
{
    fn default() -> Self {
        Ltc230x::new()
    }
}


//
// End of file
//
