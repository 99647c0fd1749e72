//! Header pin roles

use crate::error::PinFault;

/// Number of header pins
pub const HEADER_PINS: u8 = 40;

/// Header pins usable as GPIO, in connector order
pub const GPIO_PINS: [u8; 28] = [
    3, 5, 7, 8, 10, 11, 12, 13, 15, 16, 18, 19, 21, 22, 23, 24, 26, 27, 28, 29, 31, 32, 33, 35,
    36, 37, 38, 40,
];

/// Header pins routed to a PWM channel
pub const PWM_PINS: [u8; 4] = [12, 32, 33, 35];

/// What a header pin is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRole {
    /// Controller (BCM) pin
    Gpio(u8),
    Ground,
    Supply3v3,
    Supply5v,
}

/// Role of a header pin, or `None` outside 1-40
pub const fn classify(header: u8) -> Option<PinRole> {
    let role = match header {
        1 | 17 => PinRole::Supply3v3,
        2 | 4 => PinRole::Supply5v,
        6 | 9 | 14 | 20 | 25 | 30 | 34 | 39 => PinRole::Ground,
        3 => PinRole::Gpio(2),
        5 => PinRole::Gpio(3),
        7 => PinRole::Gpio(4),
        8 => PinRole::Gpio(14),
        10 => PinRole::Gpio(15),
        11 => PinRole::Gpio(17),
        12 => PinRole::Gpio(18),
        13 => PinRole::Gpio(27),
        15 => PinRole::Gpio(22),
        16 => PinRole::Gpio(23),
        18 => PinRole::Gpio(24),
        19 => PinRole::Gpio(10),
        21 => PinRole::Gpio(9),
        22 => PinRole::Gpio(25),
        23 => PinRole::Gpio(11),
        24 => PinRole::Gpio(8),
        26 => PinRole::Gpio(7),
        27 => PinRole::Gpio(0),
        28 => PinRole::Gpio(1),
        29 => PinRole::Gpio(5),
        31 => PinRole::Gpio(6),
        32 => PinRole::Gpio(12),
        33 => PinRole::Gpio(13),
        35 => PinRole::Gpio(19),
        36 => PinRole::Gpio(16),
        37 => PinRole::Gpio(26),
        38 => PinRole::Gpio(20),
        40 => PinRole::Gpio(21),
        _ => return None,
    };
    Some(role)
}

/// Controller pin for a header pin, with the reason when there is none
pub const fn lookup(header: u8) -> Result<u8, PinFault> {
    match classify(header) {
        Some(PinRole::Gpio(bcm)) => Ok(bcm),
        Some(PinRole::Ground) => Err(PinFault::Ground(header)),
        Some(PinRole::Supply3v3) => Err(PinFault::Supply3v3(header)),
        Some(PinRole::Supply5v) => Err(PinFault::Supply5v(header)),
        None => Err(PinFault::OutOfRange(header)),
    }
}
