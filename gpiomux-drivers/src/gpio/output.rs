//! Output pin handle
//!
//! Immediate writes hit the register right away. Timed writes (`on_after`,
//! `off_after`, the falling half of `pulse`) are scheduler timers owned by
//! the handle, so closing the handle cancels them.

use alloc::boxed::Box;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use gpiomux_core::scheduler::{Completion, Owner, TimerId};
use gpiomux_core::{ArgumentFault, Error, GpioOptions, Result};
use gpiomux_hal::{Direction, Driver};

use super::{check_delay, Labelled};
use crate::board::{Board, Release};

/// Digital output on one header pin
///
/// Closed automatically when dropped.
pub struct Output<D: Driver> {
    board: Board<D>,
    pin: u8,
    bcm: u8,
    session: u32,
    owner: Owner,
    options: GpioOptions,
    index: Option<u8>,
    open: bool,
}

impl<D: Driver> Output<D> {
    pub(crate) fn new(
        board: Board<D>,
        pin: u8,
        bcm: u8,
        session: u32,
        owner: Owner,
        options: GpioOptions,
    ) -> Self {
        Self {
            board,
            pin,
            bcm,
            session,
            owner,
            options,
            index: None,
            open: true,
        }
    }

    /// Header pin
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Controller (BCM) pin
    pub fn controller_pin(&self) -> u8 {
        self.bcm
    }

    /// Index label within a group
    pub fn index(&self) -> Option<u8> {
        self.index
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

    /// Read back the driven level
    pub fn read(&self) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.board.with(|st| st.driver.read_level(self.bcm)))
    }

    /// Read the level now, deliver it on the next scheduler pass
    pub fn read_async(&self, callback: impl FnOnce(bool) + 'static) -> Result<()> {
        let level = self.read()?;
        self.board
            .with(|st| st.scheduler.defer(level, Box::new(callback)));
        Ok(())
    }

    /// True if the pin is driven high
    pub fn is_on(&self) -> Result<bool> {
        self.read()
    }

    /// True if the pin is driven low
    pub fn is_off(&self) -> Result<bool> {
        self.read().map(|level| !level)
    }

    fn drive(&self, high: bool) -> Result<bool> {
        self.ensure_open()?;
        self.board.with(|st| st.driver.write_level(self.bcm, high));
        Ok(high)
    }

    /// Write a control bit (0 or 1); returns the new level
    pub fn write(&self, bit: u8) -> Result<bool> {
        match bit {
            0 => self.drive(false),
            1 => self.drive(true),
            _ => Err(ArgumentFault::ControlBit.into()),
        }
    }

    /// Write a control bit, then deliver the new level on the next pass
    pub fn write_with(&self, bit: u8, callback: impl FnOnce(bool) + 'static) -> Result<bool> {
        let level = self.write(bit)?;
        self.board
            .with(|st| st.scheduler.defer(level, Box::new(callback)));
        Ok(level)
    }

    /// Drive high
    pub fn on(&self) -> Result<bool> {
        self.drive(true)
    }

    /// Drive low
    pub fn off(&self) -> Result<bool> {
        self.drive(false)
    }

    fn schedule(&self, delay_ms: u32, high: bool, completion: Option<Completion>) -> Result<TimerId> {
        check_delay(delay_ms)?;
        self.ensure_open()?;
        Ok(self.board.with(|st| {
            let now = st.now_ms;
            st.scheduler
                .schedule(now, self.pin, self.owner, delay_ms, high, completion)
        }))
    }

    /// Drive high after `delay_ms`
    ///
    /// The completion, if any, receives the new level once written.
    pub fn on_after(&self, delay_ms: u32, completion: Option<Completion>) -> Result<TimerId> {
        self.schedule(delay_ms, true, completion)
    }

    /// Drive low after `delay_ms`
    pub fn off_after(&self, delay_ms: u32, completion: Option<Completion>) -> Result<TimerId> {
        self.schedule(delay_ms, false, completion)
    }

    /// Drive high now and low again after `width_ms`
    ///
    /// The completion, if any, receives `false` when the pulse ends.
    pub fn pulse(&self, width_ms: u32, completion: Option<Completion>) -> Result<TimerId> {
        if width_ms == 0 {
            return Err(ArgumentFault::PulseWidth.into());
        }
        check_delay(width_ms)?;
        self.drive(true)?;
        self.schedule(width_ms, false, completion)
    }

    /// Cancel a timed write that has not fired yet
    pub fn cancel(&self, timer: TimerId) -> bool {
        self.board.with(|st| st.scheduler.cancel_timer(timer))
    }

    /// Timed writes this handle still has pending
    pub fn pending(&self) -> usize {
        self.board.with(|st| st.scheduler.pending_timers(self.owner))
    }

    /// Reopen after `close`
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }
        let options = self.options;
        let (bcm, session) = self.board.with(|st| -> Result<(u8, u32)> {
            Ok((st.open_pin(self.pin, Direction::Output, &options)?, st.session))
        })?;
        self.bcm = bcm;
        self.session = session;
        self.open = true;
        Ok(())
    }

    /// Return the pin to a floating input and release it
    ///
    /// Cancels this handle's pending timed writes. Closing twice is harmless.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.board.release(Release::Pin {
            session: self.session,
            owner: self.owner,
            header: self.pin,
            bcm: self.bcm,
            direction: Direction::Output,
        });
    }
}

impl<D: Driver> Labelled for Output<D> {
    fn set_index(&mut self, index: u8) {
        self.index = Some(index);
    }
}

impl<D: Driver> Drop for Output<D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: Driver> ErrorType for Output<D> {
    type Error = Error;
}

impl<D: Driver> OutputPin for Output<D> {
    fn set_low(&mut self) -> Result<()> {
        self.off().map(|_| ())
    }

    fn set_high(&mut self) -> Result<()> {
        self.on().map(|_| ())
    }
}

impl<D: Driver> StatefulOutputPin for Output<D> {
    fn is_set_high(&mut self) -> Result<bool> {
        self.read()
    }

    fn is_set_low(&mut self) -> Result<bool> {
        self.is_off()
    }
}
