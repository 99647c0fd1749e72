//! I2C (BSC) register abstractions
//!
//! Provides the BSC master operations the I2C handle needs.

/// Errors reported by a BSC transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cFault {
    /// Slave did not acknowledge
    Nack,
    /// Slave held SCL longer than the clock stretch timeout
    ClockStretchTimeout,
    /// Transfer finished before all bytes were moved
    Incomplete,
}

/// Header pins used by the BSC master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinSet {
    /// BSC0: SDA0 / SCL0 (header 27 / 28, reserved for the HAT EEPROM)
    Sda0Scl0,
    /// BSC1: SDA1 / SCL1 (header 3 / 5)
    #[default]
    Sda1Scl1,
}

impl PinSet {
    /// Pin set from the numeric selector used by scripts (0 or 1)
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PinSet::Sda0Scl0),
            1 => Some(PinSet::Sda1Scl1),
            _ => None,
        }
    }
}

/// BSC master register access
pub trait I2cRegisters {
    /// Route the pin set to ALT0 and enable the controller
    fn i2c_start(&mut self, pins: PinSet);

    /// Disable the controller and return the pins to input
    fn i2c_stop(&mut self);

    /// Write the clock divider register
    fn i2c_set_clock_divider(&mut self, divider: u16);

    /// Write the slave address register (7-bit)
    fn i2c_select_slave(&mut self, address: u8);

    /// Write bytes to the selected slave
    fn i2c_write(&mut self, data: &[u8]) -> Result<(), I2cFault>;

    /// Read bytes from the selected slave
    fn i2c_read(&mut self, buf: &mut [u8]) -> Result<(), I2cFault>;
}

/// I2C bus speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        frequency: 1_000_000,
    };
}
