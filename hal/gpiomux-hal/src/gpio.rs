//! GPIO register abstractions
//!
//! Function select, level and pull registers for one controller pin.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pin direction (function select input/output)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// FSEL 000
    Input,
    /// FSEL 001
    Output,
}

/// Internal pull resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Pull {
    /// No pull (floating)
    #[default]
    None,
    /// Pull down to ground
    Down,
    /// Pull up to 3.3 V
    Up,
}

impl Pull {
    /// GPPUD register encoding
    pub const fn bits(self) -> u8 {
        match self {
            Pull::None => 0,
            Pull::Down => 1,
            Pull::Up => 2,
        }
    }
}

/// GPIO register access
///
/// Implementations should handle the actual register manipulation
/// for the specific SoC.
pub trait GpioRegisters {
    /// Set the function select of a pin
    fn configure(&mut self, pin: u8, direction: Direction);

    /// Read the level register (true = high)
    fn read_level(&self, pin: u8) -> bool;

    /// Drive a pin through the set/clear registers
    fn write_level(&mut self, pin: u8, high: bool);

    /// Configure the pull resistor of a pin
    fn set_pull(&mut self, pin: u8, pull: Pull);
}
