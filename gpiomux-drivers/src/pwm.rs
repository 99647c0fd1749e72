//! PWM handle
//!
//! Both PWM channels run from one clock manager divider on the 19.2 MHz
//! oscillator, so every PWM object shares the same clock. Header pins 12
//! and 32 sit on channel 1, pins 33 and 35 on channel 2; two open pins on
//! one channel always output the same waveform.
//!
//! Handles run in mark/space mode: `range` is the period and `data` the
//! pulse width, both in clock ticks.

use alloc::vec::Vec;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use gpiomux_core::{ArgumentFault, Error, PeripheralKind, Result};
use gpiomux_hal::pwm::{PWM_MAX_DIVIDER, PWM_OSCILLATOR_HZ};
use gpiomux_hal::{Driver, PwmChannel};

use crate::board::{Board, Release};

/// Clock divider for a frequency preset in kHz
pub const fn preset_divider(frequency_khz: u32) -> Option<u32> {
    match frequency_khz {
        10 => Some(1920),
        100 => Some(192),
        1000 => Some(19),
        _ => None,
    }
}

/// Full PWM setup applied at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmSetup {
    /// Clock preset: 10, 100 or 1000 kHz
    pub frequency_khz: u32,
    /// Period in clock ticks (range register)
    pub period: u32,
    /// Pulse width in clock ticks (data register)
    pub pulse_width: u32,
}

impl PwmSetup {
    /// Create a setup
    pub const fn new(frequency_khz: u32, period: u32, pulse_width: u32) -> Self {
        Self {
            frequency_khz,
            period,
            pulse_width,
        }
    }

    /// Clock divider for the preset
    pub fn divider(&self) -> Result<u32> {
        preset_divider(self.frequency_khz).ok_or(Error::InvalidArgument(ArgumentFault::Frequency))
    }
}

/// Open PWM pins, board-wide
#[derive(Debug, Default)]
pub(crate) struct PwmTracker {
    open: Vec<u8>,
}

impl PwmTracker {
    /// Record an open PWM pin
    ///
    /// A PWM pin can only be open once.
    pub(crate) fn open(&mut self, header: u8, bcm: u8) -> Result<()> {
        if self.open.contains(&header) {
            return Err(Error::DuplicatePin(header));
        }
        self.open.push(header);

        if self.open.len() > 1 {
            log::warn!(
                "{} PWM objects open, they share one clock frequency",
                self.open.len()
            );
        }
        let channel = PwmChannel::for_pin(bcm);
        let partner = self
            .open
            .iter()
            .find(|&&other| other != header && channel_of(other) == channel);
        if let Some(partner) = partner {
            log::warn!(
                "paired PWM pins {} and {} detected, range and data will be the same for both",
                partner,
                header
            );
        }
        Ok(())
    }

    pub(crate) fn close(&mut self, header: u8) {
        self.open.retain(|&p| p != header);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.open.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.open.len()
    }
}

fn channel_of(header: u8) -> Option<PwmChannel> {
    match header {
        12 | 32 => Some(PwmChannel::One),
        33 | 35 => Some(PwmChannel::Two),
        _ => None,
    }
}

impl<D: Driver> Board<D> {
    /// Open a PWM pin
    ///
    /// With `setup`, the clock, period and pulse width are programmed and
    /// the channel starts. Without it only the pin is routed; call
    /// `set_clock_divider`, `set_range` and `set_data` afterwards.
    pub fn pwm(&self, pin: u8, setup: Option<PwmSetup>) -> Result<Pwm<D>> {
        let divider = setup.map(|s| s.divider()).transpose()?;
        let (bcm, session) = self.with(|st| -> Result<(u8, u32)> {
            let bcm = st.translator.translate_pwm(pin)?;
            st.claim(PeripheralKind::Pwm)?;
            st.pwm.open(pin, bcm)?;
            st.driver.pwm_attach(bcm);
            st.driver.pwm_set_mark_space(bcm, true);
            st.driver.pwm_enable(bcm, false);
            Ok((bcm, st.session))
        })?;

        let mut pwm = Pwm {
            board: self.clone(),
            pin,
            bcm,
            session,
            divider: None,
            range: 0,
            data: 0,
            started: false,
            open: true,
        };
        match (setup, divider) {
            (Some(setup), Some(divider)) => {
                pwm.set_clock_divider(divider)?;
                pwm.set_range(setup.period)?;
                pwm.set_data(setup.pulse_width)?;
                log::info!(
                    "PWM config: pin {}, freq {} kHz, T {}, pw {}",
                    pin,
                    setup.frequency_khz,
                    setup.period,
                    setup.pulse_width
                );
            }
            _ => log::info!("PWM config: pin {}", pin),
        }
        Ok(pwm)
    }

    /// Number of open PWM pins
    pub fn pwm_count(&self) -> usize {
        self.with(|st| st.pwm.len())
    }
}

/// PWM output on one header pin
///
/// Closed automatically when dropped.
pub struct Pwm<D: Driver> {
    board: Board<D>,
    pin: u8,
    bcm: u8,
    session: u32,
    divider: Option<u32>,
    range: u32,
    data: u32,
    started: bool,
    open: bool,
}

impl<D: Driver> Pwm<D> {
    /// Header pin
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Channel this pin drives
    pub fn channel(&self) -> Option<PwmChannel> {
        PwmChannel::for_pin(self.bcm)
    }

    /// Period (range register)
    pub fn range(&self) -> u32 {
        self.range
    }

    /// Pulse width (data register)
    pub fn data(&self) -> u32 {
        self.data
    }

    /// Divider last programmed through this handle
    pub fn divider(&self) -> Option<u32> {
        self.divider
    }

    /// Clock frequency in Hz from the last programmed divider
    pub fn clock_hz(&self) -> Option<u32> {
        self.divider.map(|div| PWM_OSCILLATOR_HZ / div)
    }

    /// True while pulsing
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True until closed (or until the board shuts down)
    pub fn is_open(&self) -> bool {
        self.open && self.board.session() == self.session
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::Closed { pin: self.pin })
        }
    }

    fn enable(&self, enabled: bool) {
        self.board
            .with(|st| st.driver.pwm_enable(self.bcm, enabled));
    }

    fn write_data(&self, data: u32) {
        self.board.with(|st| st.driver.pwm_set_data(self.bcm, data));
    }

    /// Set the shared clock divider (1-4094)
    pub fn set_clock_divider(&mut self, divider: u32) -> Result<()> {
        self.ensure_open()?;
        if divider == 0 || divider >= PWM_MAX_DIVIDER {
            return Err(ArgumentFault::ClockDivider.into());
        }
        self.board
            .with(|st| st.driver.pwm_set_clock_divider(divider));
        self.divider = Some(divider);
        let hz = PWM_OSCILLATOR_HZ / divider;
        log::info!(
            "PWM clock {}.{:03} kHz (div {})",
            hz / 1000,
            hz % 1000,
            divider
        );
        Ok(())
    }

    /// Set the period (range register)
    pub fn set_range(&mut self, range: u32) -> Result<()> {
        self.ensure_open()?;
        self.range = range;
        self.board
            .with(|st| st.driver.pwm_set_range(self.bcm, range));
        Ok(())
    }

    /// Set the pulse width (data register) and enable the channel
    pub fn set_data(&mut self, data: u32) -> Result<()> {
        self.ensure_open()?;
        self.data = data;
        self.enable(true);
        if self.range == 0 {
            log::warn!(
                "PWM pin {} range is 0, set a range first with set_range",
                self.pin
            );
        } else if data > self.range {
            log::warn!(
                "PWM pin {} pulse width {} is higher than the period {}",
                self.pin,
                data,
                self.range
            );
        }
        self.write_data(data);
        Ok(())
    }

    /// Output the stored pulse width
    ///
    /// A stored width of 1 means full duty and is widened to the period.
    pub fn start(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.data == 1 {
            self.data = self.range;
        }
        self.enable(true);
        self.started = true;
        self.write_data(self.data);
        Ok(())
    }

    /// Disable the channel
    pub fn stop(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.enable(false);
        self.started = false;
        Ok(())
    }

    /// Start pulsing, with the stored width or a one-off `width`
    pub fn pulse(&mut self, width: Option<u32>) -> Result<()> {
        self.ensure_open()?;
        if !self.started {
            self.enable(true);
        }
        self.started = true;
        match width {
            Some(width) => {
                self.write_data(width);
                Ok(())
            }
            None => self.set_data(self.data),
        }
    }

    /// Stop pulsing
    pub fn stop_pulse(&mut self) -> Result<()> {
        self.stop()
    }

    /// Disable the channel, zero range and data, and release the pin
    ///
    /// The full access mode stays committed. Closing twice is harmless.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.started = false;
        self.range = 0;
        self.data = 0;
        self.board.release(Release::Pwm {
            session: self.session,
            header: self.pin,
            bcm: self.bcm,
        });
    }
}

impl<D: Driver> Drop for Pwm<D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: Driver> ErrorType for Pwm<D> {
    type Error = Error;
}

impl<D: Driver> SetDutyCycle for Pwm<D> {
    fn max_duty_cycle(&self) -> u16 {
        self.range.clamp(1, u32::from(u16::MAX)) as u16
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<()> {
        self.set_data(u32::from(duty))
    }
}
