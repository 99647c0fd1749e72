//! Simulated register driver
//!
//! Implements every `gpiomux-hal` trait against an in-memory register
//! model. The handle is cheap to clone; clones share the same model so a
//! test can keep one copy for poking inputs and inspecting outputs while
//! the board context owns another.
//!
//! Model rules:
//! - An output pin reads back the level last written to it.
//! - An input pin reads the level forced with [`SimBoard::set_input`], or
//!   follows its pull resistor (up reads high, down and floating read low).
//! - I2C slaves must be attached with [`SimBoard::attach_i2c_device`];
//!   an attached slave echoes the last bytes written to it.
//! - SPI is wired in loopback (MOSI to MISO).

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

mod registers;

use alloc::rc::Rc;
use core::cell::RefCell;

use gpiomux_hal::{
    AccessFault, AccessWindow, Direction, GpioRegisters, I2cFault, I2cRegisters, Mode, PinSet,
    Pull, PwmChannel, PwmRegisters, SpiRegisters, Window,
};

pub use registers::{I2cState, PinState, PwmChannelState, SimState, SpiState, NUM_PINS};

/// Shared handle to a simulated register file
#[derive(Debug, Clone, Default)]
pub struct SimBoard {
    state: Rc<RefCell<SimState>>,
}

impl SimBoard {
    /// Create a simulator with every pin as a floating input
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the external level seen by an input pin
    pub fn set_input(&self, pin: u8, high: bool) {
        if let Some(p) = self.state.borrow_mut().pins.get_mut(pin as usize) {
            p.external = Some(high);
        }
    }

    /// Stop forcing a pin, letting its pull resistor decide
    pub fn release_input(&self, pin: u8) {
        if let Some(p) = self.state.borrow_mut().pins.get_mut(pin as usize) {
            p.external = None;
        }
    }

    /// Snapshot of one pin
    pub fn pin(&self, pin: u8) -> PinState {
        self.state
            .borrow()
            .pins
            .get(pin as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Currently mapped window
    pub fn window(&self) -> Option<Window> {
        self.state.borrow().window
    }

    /// Number of successful window opens so far
    pub fn window_opens(&self) -> u32 {
        self.state.borrow().window_opens
    }

    /// Make the next `open_window` call fail
    pub fn fail_next_open(&self, fault: AccessFault) {
        self.state.borrow_mut().pending_fault = Some(fault);
    }

    /// PWM clock divider last written
    pub fn pwm_clock_divider(&self) -> u32 {
        self.state.borrow().pwm_divider
    }

    /// Snapshot of a PWM channel
    pub fn pwm_channel(&self, channel: PwmChannel) -> PwmChannelState {
        let state = self.state.borrow();
        match channel {
            PwmChannel::One => state.pwm[0],
            PwmChannel::Two => state.pwm[1],
        }
    }

    /// Number of PWM control resets issued
    pub fn pwm_resets(&self) -> u32 {
        self.state.borrow().pwm_resets
    }

    /// Snapshot of the BSC master
    pub fn i2c(&self) -> I2cState {
        self.state.borrow().i2c.clone()
    }

    /// Put a slave on the simulated bus
    pub fn attach_i2c_device(&self, address: u8) {
        let mut state = self.state.borrow_mut();
        if !state.i2c.devices.contains(&address) {
            let _ = state.i2c.devices.push(address);
        }
    }

    /// Snapshot of SPI0
    pub fn spi(&self) -> SpiState {
        self.state.borrow().spi.clone()
    }
}

impl AccessWindow for SimBoard {
    fn open_window(&mut self, window: Window) -> Result<(), AccessFault> {
        let mut state = self.state.borrow_mut();
        if let Some(fault) = state.pending_fault.take() {
            log::debug!("sim: {:?} window open failed: {}", window, fault.reason());
            return Err(fault);
        }
        state.window = Some(window);
        state.window_opens += 1;
        Ok(())
    }

    fn close_window(&mut self) {
        self.state.borrow_mut().window = None;
    }
}

impl GpioRegisters for SimBoard {
    fn configure(&mut self, pin: u8, direction: Direction) {
        if let Some(p) = self.state.borrow_mut().pins.get_mut(pin as usize) {
            p.direction = direction;
        }
    }

    fn read_level(&self, pin: u8) -> bool {
        self.pin(pin).level()
    }

    fn write_level(&mut self, pin: u8, high: bool) {
        if let Some(p) = self.state.borrow_mut().pins.get_mut(pin as usize) {
            p.latch = high;
            p.writes += 1;
        }
    }

    fn set_pull(&mut self, pin: u8, pull: Pull) {
        if let Some(p) = self.state.borrow_mut().pins.get_mut(pin as usize) {
            p.pull = pull;
        }
    }
}

impl PwmRegisters for SimBoard {
    fn pwm_attach(&mut self, pin: u8) {
        if let Some(p) = self.state.borrow_mut().pins.get_mut(pin as usize) {
            p.alt_function = true;
        }
    }

    fn pwm_set_clock_divider(&mut self, divider: u32) {
        self.state.borrow_mut().pwm_divider = divider;
    }

    fn pwm_set_mark_space(&mut self, pin: u8, mark_space: bool) {
        self.with_channel(pin, |ch| ch.mark_space = mark_space);
    }

    fn pwm_enable(&mut self, pin: u8, enabled: bool) {
        self.with_channel(pin, |ch| ch.enabled = enabled);
    }

    fn pwm_set_range(&mut self, pin: u8, range: u32) {
        self.with_channel(pin, |ch| ch.range = range);
    }

    fn pwm_set_data(&mut self, pin: u8, data: u32) {
        self.with_channel(pin, |ch| ch.data = data);
    }

    fn pwm_reset(&mut self) {
        let mut state = self.state.borrow_mut();
        state.pwm = [PwmChannelState::default(); 2];
        state.pwm_resets += 1;
    }
}

impl SimBoard {
    fn with_channel(&mut self, pin: u8, f: impl FnOnce(&mut PwmChannelState)) {
        let mut state = self.state.borrow_mut();
        match PwmChannel::for_pin(pin) {
            Some(PwmChannel::One) => f(&mut state.pwm[0]),
            Some(PwmChannel::Two) => f(&mut state.pwm[1]),
            None => {}
        }
    }
}

impl I2cRegisters for SimBoard {
    fn i2c_start(&mut self, pins: PinSet) {
        let mut state = self.state.borrow_mut();
        state.i2c.enabled = true;
        state.i2c.pins = Some(pins);
    }

    fn i2c_stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.i2c.enabled = false;
        state.i2c.pins = None;
    }

    fn i2c_set_clock_divider(&mut self, divider: u16) {
        self.state.borrow_mut().i2c.divider = divider;
    }

    fn i2c_select_slave(&mut self, address: u8) {
        self.state.borrow_mut().i2c.slave = address;
    }

    fn i2c_write(&mut self, data: &[u8]) -> Result<(), I2cFault> {
        let mut state = self.state.borrow_mut();
        let i2c = &mut state.i2c;
        if !i2c.devices.contains(&i2c.slave) {
            return Err(I2cFault::Nack);
        }
        i2c.last_write.clear();
        for &b in data {
            if i2c.last_write.push(b).is_err() {
                return Err(I2cFault::Incomplete);
            }
        }
        Ok(())
    }

    fn i2c_read(&mut self, buf: &mut [u8]) -> Result<(), I2cFault> {
        let state = self.state.borrow();
        let i2c = &state.i2c;
        if !i2c.devices.contains(&i2c.slave) {
            return Err(I2cFault::Nack);
        }
        for (i, b) in buf.iter_mut().enumerate() {
            *b = if i2c.last_write.is_empty() {
                0
            } else {
                i2c.last_write[i % i2c.last_write.len()]
            };
        }
        Ok(())
    }
}

impl SpiRegisters for SimBoard {
    fn spi_start(&mut self) {
        self.state.borrow_mut().spi.enabled = true;
    }

    fn spi_stop(&mut self) {
        self.state.borrow_mut().spi.enabled = false;
    }

    fn spi_set_clock_divider(&mut self, divider: u16) {
        self.state.borrow_mut().spi.divider = divider;
    }

    fn spi_set_mode(&mut self, mode: Mode) {
        let (polarity, phase) = mode.into();
        let mut state = self.state.borrow_mut();
        let spi = &mut state.spi;
        spi.mode = mode;
        spi.polarity = polarity;
        spi.phase = phase;
    }

    fn spi_chip_select(&mut self, cs: u8) {
        self.state.borrow_mut().spi.chip_select = cs;
    }

    fn spi_set_cs_polarity(&mut self, cs: u8, active_high: bool) {
        if let Some(p) = self.state.borrow_mut().spi.cs_active_high.get_mut(cs as usize) {
            *p = active_high;
        }
    }

    fn spi_transfer(&mut self, write: &[u8], read: &mut [u8]) {
        self.spi_write(write);
        for (r, w) in read.iter_mut().zip(write.iter()) {
            *r = *w;
        }
    }

    fn spi_write(&mut self, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        for &b in data {
            // Oldest bytes are dropped once the capture is full
            if state.spi.sent.is_full() {
                state.spi.sent.remove(0);
            }
            let _ = state.spi.sent.push(b);
        }
    }

    fn spi_read(&mut self, buf: &mut [u8]) {
        buf.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpiomux_hal::{Phase, Polarity};

    #[test]
    fn test_floating_input_reads_low() {
        let sim = SimBoard::new();
        assert!(!sim.read_level(17));
    }

    #[test]
    fn test_pull_up_reads_high() {
        let mut sim = SimBoard::new();
        sim.set_pull(17, Pull::Up);
        assert!(sim.read_level(17));
        sim.set_input(17, false);
        assert!(!sim.read_level(17));
    }

    #[test]
    fn test_output_reads_latch() {
        let mut sim = SimBoard::new();
        sim.configure(13, Direction::Output);
        sim.write_level(13, true);
        assert!(sim.read_level(13));
        // Forced input level is ignored while driving
        sim.set_input(13, false);
        assert!(sim.read_level(13));
    }

    #[test]
    fn test_clones_share_state() {
        let mut sim = SimBoard::new();
        let probe = sim.clone();
        sim.configure(4, Direction::Output);
        assert_eq!(probe.pin(4).direction, Direction::Output);
    }

    #[test]
    fn test_window_fault_is_one_shot() {
        let mut sim = SimBoard::new();
        sim.fail_next_open(AccessFault::PermissionDenied);
        assert_eq!(
            sim.open_window(Window::Full),
            Err(AccessFault::PermissionDenied)
        );
        assert_eq!(sim.window(), None);
        assert_eq!(sim.open_window(Window::Full), Ok(()));
        assert_eq!(sim.window(), Some(Window::Full));
    }

    #[test]
    fn test_i2c_nack_without_device() {
        let mut sim = SimBoard::new();
        sim.i2c_select_slave(0x48);
        assert_eq!(sim.i2c_write(&[1, 2]), Err(I2cFault::Nack));
    }

    #[test]
    fn test_i2c_echo() {
        let mut sim = SimBoard::new();
        sim.attach_i2c_device(0x48);
        sim.i2c_select_slave(0x48);
        sim.i2c_write(&[0xAA, 0x55]).unwrap();
        let mut buf = [0u8; 3];
        sim.i2c_read(&mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0x55, 0xAA]);
    }

    #[test]
    fn test_spi_loopback() {
        let mut sim = SimBoard::new();
        let mut rx = [0u8; 3];
        sim.spi_transfer(&[1, 2, 3], &mut rx);
        assert_eq!(rx, [1, 2, 3]);
        assert_eq!(sim.spi().sent.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_spi_mode_sets_clock_bits() {
        let mut sim = SimBoard::new();
        assert_eq!(sim.spi().polarity, Polarity::IdleLow);
        sim.spi_set_mode(Mode::Mode2);
        let spi = sim.spi();
        assert_eq!(spi.polarity, Polarity::IdleHigh);
        assert_eq!(spi.phase, Phase::CaptureOnFirstTransition);
        sim.spi_set_mode(Mode::Mode1);
        let spi = sim.spi();
        assert_eq!(spi.polarity, Polarity::IdleLow);
        assert_eq!(spi.phase, Phase::CaptureOnSecondTransition);
    }

    #[test]
    fn test_pwm_channel_routing() {
        let mut sim = SimBoard::new();
        sim.pwm_set_range(18, 1024);
        sim.pwm_set_data(19, 7);
        assert_eq!(sim.pwm_channel(PwmChannel::One).range, 1024);
        assert_eq!(sim.pwm_channel(PwmChannel::Two).data, 7);
        // Pins on the same channel share registers
        assert_eq!(
            sim.pwm_channel(PwmChannel::One),
            PwmChannelState {
                range: 1024,
                ..Default::default()
            }
        );
    }
}
