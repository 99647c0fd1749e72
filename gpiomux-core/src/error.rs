//! Error taxonomy
//!
//! Every failure carries a kind for branching and a stable message for
//! scripts that match on text.

use core::fmt;

use gpiomux_hal::{AccessFault, I2cFault};

use crate::arbiter::PeripheralKind;

/// Result alias used across gpiomux
pub type Result<T> = core::result::Result<T, Error>;

/// Why a header pin was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinFault {
    /// Outside 1-40
    OutOfRange(u8),
    /// Ground pin
    Ground(u8),
    /// 3.3 V supply pin
    Supply3v3(u8),
    /// 5 V supply pin
    Supply5v(u8),
    /// Valid GPIO pin that has no PWM function
    NotPwm(u8),
}

impl PinFault {
    /// Offending header pin
    pub const fn pin(self) -> u8 {
        match self {
            PinFault::OutOfRange(p)
            | PinFault::Ground(p)
            | PinFault::Supply3v3(p)
            | PinFault::Supply5v(p)
            | PinFault::NotPwm(p) => p,
        }
    }
}

impl fmt::Display for PinFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinFault::OutOfRange(p) => write!(f, "{} is outside header pins 1-40", p),
            PinFault::Ground(p) => write!(f, "{} is a ground pin", p),
            PinFault::Supply3v3(p) => write!(f, "{} is a 3.3V supply pin", p),
            PinFault::Supply5v(p) => write!(f, "{} is a 5V supply pin", p),
            PinFault::NotPwm(p) => write!(f, "{} is not a PWM pin", p),
        }
    }
}

/// Malformed call arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgumentFault {
    /// Bit value other than 0 or 1
    ControlBit,
    /// Delay above the one hour ceiling
    Delay,
    /// Unknown edge filter
    Edge,
    /// Zero poll interval
    PollInterval,
    /// Unknown pull resistor code
    PullResistor,
    /// Pulse width missing or zero
    PulseWidth,
    /// Empty or oversized pin list
    PinList,
    /// Clock divider outside the peripheral's range
    ClockDivider,
    /// PWM frequency preset other than 10, 100 or 1000 kHz
    Frequency,
    /// Zero I2C baud rate
    BaudRate,
    /// I2C address above 0x7F
    SlaveAddress,
    /// I2C pin set other than 0 or 1
    PinSet,
    /// SPI data mode outside 0-3
    DataMode,
    /// SPI chip select outside 0-2
    ChipSelect,
}

impl ArgumentFault {
    /// Stable message
    pub const fn message(self) -> &'static str {
        match self {
            ArgumentFault::ControlBit => "invalid control bit argument",
            ArgumentFault::Delay => "invalid delay argument",
            ArgumentFault::Edge => "invalid edge argument",
            ArgumentFault::PollInterval => "invalid poll interval",
            ArgumentFault::PullResistor => "invalid pull resistor argument",
            ArgumentFault::PulseWidth => "invalid pulse width time duration",
            ArgumentFault::PinList => "invalid arguments",
            ArgumentFault::ClockDivider => "invalid clock divider",
            ArgumentFault::Frequency => "invalid frequency",
            ArgumentFault::BaudRate => "invalid baud rate",
            ArgumentFault::SlaveAddress => "invalid slave address",
            ArgumentFault::PinSet => "invalid pin set",
            ArgumentFault::DataMode => "invalid data mode",
            ArgumentFault::ChipSelect => "invalid chip select",
        }
    }
}

impl fmt::Display for ArgumentFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Error kind for callers that branch on category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    InvalidPin,
    ModeConflict,
    DuplicatePin,
    InvalidArgument,
    BufferTooSmall,
    HardwareAccess,
    Bus,
    NotStarted,
    Closed,
}

/// gpiomux error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Pin cannot be opened for the requested use
    #[error("invalid pin: {0}")]
    InvalidPin(PinFault),

    /// Access mode already committed by another peripheral kind
    #[error("access mode conflict: {requested} needs the {} window but {owner} holds the {} window", .requested.window_name(), .owner.window_name())]
    ModeConflict {
        requested: PeripheralKind,
        owner: PeripheralKind,
    },

    /// Pin already open (strict duplicate check, or a PWM pin)
    #[error("pin {0} is already in use")]
    DuplicatePin(u8),

    /// Malformed arguments
    #[error("{0}")]
    InvalidArgument(ArgumentFault),

    /// Requested transfer length exceeds the buffer
    #[error("Insufficient buffer size: requested {requested}, capacity {capacity}")]
    BufferTooSmall { requested: usize, capacity: usize },

    /// Register window could not be mapped
    #[error("hardware access failure: {}", .0.reason())]
    HardwareAccess(AccessFault),

    /// Bus transfer failed
    #[error("bus error: {0:?}")]
    Bus(I2cFault),

    /// Peripheral used before begin()
    #[error("{0} is not started")]
    NotStarted(PeripheralKind),

    /// Handle used after close()
    #[error("pin {pin} is closed")]
    Closed { pin: u8 },
}

impl Error {
    /// Category of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPin(_) => ErrorKind::InvalidPin,
            Error::ModeConflict { .. } => ErrorKind::ModeConflict,
            Error::DuplicatePin(_) => ErrorKind::DuplicatePin,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Error::HardwareAccess(_) => ErrorKind::HardwareAccess,
            Error::Bus(_) => ErrorKind::Bus,
            Error::NotStarted(_) => ErrorKind::NotStarted,
            Error::Closed { .. } => ErrorKind::Closed,
        }
    }
}

impl From<PinFault> for Error {
    fn from(fault: PinFault) -> Self {
        Error::InvalidPin(fault)
    }
}

impl From<ArgumentFault> for Error {
    fn from(fault: ArgumentFault) -> Self {
        Error::InvalidArgument(fault)
    }
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl embedded_hal::pwm::Error for Error {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind as Kind, NoAcknowledgeSource};
        match self {
            Error::Bus(I2cFault::Nack) => Kind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Error::Bus(_) => Kind::Bus,
            Error::BufferTooSmall { .. } => Kind::Overrun,
            _ => Kind::Other,
        }
    }
}

impl embedded_hal::spi::Error for Error {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        match self {
            Error::InvalidArgument(ArgumentFault::ChipSelect) => {
                embedded_hal::spi::ErrorKind::ChipSelectFault
            }
            _ => embedded_hal::spi::ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_messages_are_stable() {
        assert_eq!(
            Error::InvalidPin(PinFault::Ground(6)).to_string(),
            "invalid pin: 6 is a ground pin"
        );
        assert_eq!(
            Error::from(ArgumentFault::ControlBit).to_string(),
            "invalid control bit argument"
        );
        assert_eq!(
            Error::from(ArgumentFault::Edge).to_string(),
            "invalid edge argument"
        );
        assert_eq!(
            Error::BufferTooSmall {
                requested: 8,
                capacity: 4
            }
            .to_string(),
            "Insufficient buffer size: requested 8, capacity 4"
        );
    }

    #[test]
    fn test_mode_conflict_names_both_kinds() {
        let msg = Error::ModeConflict {
            requested: PeripheralKind::I2c,
            owner: PeripheralKind::Gpio,
        }
        .to_string();
        assert!(msg.contains("I2C"));
        assert!(msg.contains("GPIO"));
    }

    #[test]
    fn test_kind() {
        assert_eq!(Error::DuplicatePin(11).kind(), ErrorKind::DuplicatePin);
        assert_eq!(
            Error::HardwareAccess(AccessFault::PermissionDenied).kind(),
            ErrorKind::HardwareAccess
        );
        assert_eq!(Error::Closed { pin: 3 }.kind(), ErrorKind::Closed);
    }

    #[test]
    fn test_i2c_nack_maps_to_embedded_hal() {
        use embedded_hal::i2c::{ErrorKind as Kind, NoAcknowledgeSource};
        assert_eq!(
            embedded_hal::i2c::Error::kind(&Error::Bus(I2cFault::Nack)),
            Kind::NoAcknowledge(NoAcknowledgeSource::Unknown)
        );
    }
}
