//! PWM register abstractions
//!
//! The SoC has one PWM block with two channels fed by a single clock
//! manager divider. Two header pins are routed to each channel, so pins
//! on the same channel always output the same waveform.

/// PWM clock source (oscillator) frequency in Hz
pub const PWM_OSCILLATOR_HZ: u32 = 19_200_000;

/// Largest divider accepted by the PWM clock manager
pub const PWM_MAX_DIVIDER: u32 = 4095;

/// PWM channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmChannel {
    /// PWM0 (GPIO 12 and 18)
    One,
    /// PWM1 (GPIO 13 and 19)
    Two,
}

impl PwmChannel {
    /// Channel that a controller pin is routed to, if any
    pub const fn for_pin(pin: u8) -> Option<Self> {
        match pin {
            12 | 18 => Some(PwmChannel::One),
            13 | 19 => Some(PwmChannel::Two),
            _ => None,
        }
    }
}

/// PWM register access
pub trait PwmRegisters {
    /// Route a pin to its PWM alternate function
    fn pwm_attach(&mut self, pin: u8);

    /// Stop the clock manager and set the oscillator divider
    fn pwm_set_clock_divider(&mut self, divider: u32);

    /// Select mark/space (true) or balanced (false) mode for the pin's channel
    fn pwm_set_mark_space(&mut self, pin: u8, mark_space: bool);

    /// Enable or disable the pin's channel
    fn pwm_enable(&mut self, pin: u8, enabled: bool);

    /// Write the channel range register
    fn pwm_set_range(&mut self, pin: u8, range: u32);

    /// Write the channel data register
    fn pwm_set_data(&mut self, pin: u8, data: u32);

    /// Clear the control and status registers
    fn pwm_reset(&mut self);
}
