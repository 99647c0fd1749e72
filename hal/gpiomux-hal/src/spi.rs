//! SPI0 register abstractions
//!
//! Provides the SPI master operations the SPI handle needs.

/// SPI clock polarity (CS register CPOL bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    #[default]
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase (CS register CPHA bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    #[default]
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Mode from its number (0-3)
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Mode::Mode0),
            1 => Some(Mode::Mode1),
            2 => Some(Mode::Mode2),
            3 => Some(Mode::Mode3),
            _ => None,
        }
    }
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

/// SPI0 master register access
pub trait SpiRegisters {
    /// Route SPI0 pins to ALT0 and clear the FIFOs
    fn spi_start(&mut self);

    /// Return SPI0 pins to input
    fn spi_stop(&mut self);

    /// Write the clock divider register (0 means 65536)
    fn spi_set_clock_divider(&mut self, divider: u16);

    /// Set CPOL/CPHA
    fn spi_set_mode(&mut self, mode: Mode);

    /// Select chip select line 0-2
    fn spi_chip_select(&mut self, cs: u8);

    /// Set the active level of a chip select line
    fn spi_set_cs_polarity(&mut self, cs: u8, active_high: bool);

    /// Full duplex transfer; `read` receives as many bytes as `write` sends
    fn spi_transfer(&mut self, write: &[u8], read: &mut [u8]);

    /// Write bytes, discarding what is clocked in
    fn spi_write(&mut self, data: &[u8]);

    /// Read bytes while clocking out zeros
    fn spi_read(&mut self, buf: &mut [u8]);
}
