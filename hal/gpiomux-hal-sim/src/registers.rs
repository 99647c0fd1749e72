//! Register model

use gpiomux_hal::{AccessFault, Direction, Mode, Phase, PinSet, Polarity, Pull, Window};
use heapless::Vec;

/// Controller pins modelled (BCM 0-53)
pub const NUM_PINS: usize = 54;

/// One controller pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinState {
    /// Function select
    pub direction: Direction,
    /// Pull resistor
    pub pull: Pull,
    /// Output latch
    pub latch: bool,
    /// Level forced from outside, if any
    pub external: Option<bool>,
    /// Routed to a peripheral alternate function
    pub alt_function: bool,
    /// Number of level writes
    pub writes: u32,
}

impl Default for PinState {
    fn default() -> Self {
        Self {
            direction: Direction::Input,
            pull: Pull::None,
            latch: false,
            external: None,
            alt_function: false,
            writes: 0,
        }
    }
}

impl PinState {
    /// Level the pin would read back
    pub fn level(&self) -> bool {
        match self.direction {
            Direction::Output => self.latch,
            Direction::Input => self.external.unwrap_or(self.pull == Pull::Up),
        }
    }
}

/// One PWM channel's registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PwmChannelState {
    pub enabled: bool,
    pub mark_space: bool,
    pub range: u32,
    pub data: u32,
}

/// BSC master registers and attached slaves
#[derive(Debug, Clone, Default)]
pub struct I2cState {
    pub enabled: bool,
    pub pins: Option<PinSet>,
    pub divider: u16,
    pub slave: u8,
    pub devices: Vec<u8, 8>,
    pub last_write: Vec<u8, 64>,
}

/// SPI0 registers and transmit capture
#[derive(Debug, Clone, Default)]
pub struct SpiState {
    pub enabled: bool,
    pub divider: u16,
    pub mode: Mode,
    /// CPOL bit decoded from the mode
    pub polarity: Polarity,
    /// CPHA bit decoded from the mode
    pub phase: Phase,
    pub chip_select: u8,
    pub cs_active_high: [bool; 3],
    pub sent: Vec<u8, 256>,
}

/// Whole register file
#[derive(Debug)]
pub struct SimState {
    pub pins: [PinState; NUM_PINS],
    pub window: Option<Window>,
    pub window_opens: u32,
    pub pending_fault: Option<AccessFault>,
    pub pwm_divider: u32,
    pub pwm: [PwmChannelState; 2],
    pub pwm_resets: u32,
    pub i2c: I2cState,
    pub spi: SpiState,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            pins: [PinState::default(); NUM_PINS],
            window: None,
            window_opens: 0,
            pending_fault: None,
            pwm_divider: 0,
            pwm: [PwmChannelState::default(); 2],
            pwm_resets: 0,
            i2c: I2cState::default(),
            spi: SpiState::default(),
        }
    }
}
