//! Input pin handle

use alloc::boxed::Box;

use embedded_hal::digital::{ErrorType, InputPin};
use gpiomux_core::scheduler::{edge_callback, Owner, WatchOrigin};
use gpiomux_core::{ArgumentFault, Edge, Error, GpioOptions, Result};
use gpiomux_hal::{Direction, Driver, Pull};

use super::Labelled;
use crate::board::{Board, Release};

/// Digital input on one header pin
///
/// Closed automatically when dropped.
pub struct Input<D: Driver> {
    board: Board<D>,
    pin: u8,
    bcm: u8,
    session: u32,
    owner: Owner,
    options: GpioOptions,
    index: Option<u8>,
    open: bool,
}

impl<D: Driver> Input<D> {
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

    /// Current pull resistor
    pub fn pull(&self) -> Pull {
        self.options.pull
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

    /// Read the pin level
    pub fn read(&self) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.board.with(|st| st.driver.read_level(self.bcm)))
    }

    /// Read the pin level now, deliver it on the next scheduler pass
    pub fn read_async(&self, callback: impl FnOnce(bool) + 'static) -> Result<()> {
        let level = self.read()?;
        self.board
            .with(|st| st.scheduler.defer(level, Box::new(callback)));
        Ok(())
    }

    /// True if the pin reads high
    pub fn is_on(&self) -> Result<bool> {
        self.read()
    }

    /// True if the pin reads low
    pub fn is_off(&self) -> Result<bool> {
        self.read().map(|level| !level)
    }

    /// Change the pull resistor
    pub fn set_pull(&mut self, pull: Pull) -> Result<()> {
        self.ensure_open()?;
        self.board.with(|st| st.driver.set_pull(self.bcm, pull));
        self.options.pull = pull;
        Ok(())
    }

    /// Change the pull resistor by code: 1 pulls up, 0 pulls down
    pub fn set_pull_code(&mut self, code: u8) -> Result<()> {
        let pull = match code {
            1 => Pull::Up,
            0 => Pull::Down,
            _ => return Err(ArgumentFault::PullResistor.into()),
        };
        self.set_pull(pull)
    }

    /// Watch the pin for edges
    ///
    /// The callback gets `(level, header_pin)` for each transition that
    /// passes `edge`. Replaces any watch already on this pin.
    pub fn watch(
        &self,
        edge: Edge,
        interval_ms: Option<u32>,
        callback: impl FnMut(bool, u8) + 'static,
    ) -> Result<()> {
        self.ensure_open()?;
        let callback = edge_callback(callback);
        self.board.with(|st| {
            let initial = st.driver.read_level(self.bcm);
            let now = st.now_ms;
            st.scheduler.arm(
                now,
                self.pin,
                self.owner,
                edge,
                interval_ms,
                initial,
                WatchOrigin::Single,
                callback,
            )
        })
    }

    /// Watch with the edge and interval this pin was opened with
    pub fn watch_default(&self, callback: impl FnMut(bool, u8) + 'static) -> Result<()> {
        self.watch(self.options.edge, self.options.poll_interval_ms, callback)
    }

    /// Stop watching; does nothing if the pin is not watched
    pub fn unwatch(&self) {
        self.board.with(|st| st.scheduler.unwatch(self.pin));
    }

    /// True if a watch is armed on this pin
    pub fn is_watched(&self) -> bool {
        self.board.with(|st| st.scheduler.watch(self.pin).is_some())
    }

    /// Reopen after `close`
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }
        let options = self.options;
        let (bcm, session) = self.board.with(|st| -> Result<(u8, u32)> {
            Ok((st.open_pin(self.pin, Direction::Input, &options)?, st.session))
        })?;
        self.bcm = bcm;
        self.session = session;
        self.open = true;
        Ok(())
    }

    /// Return the pin to a floating input and release it
    ///
    /// Cancels the watch this handle armed; a duplicate handle on the same
    /// pin keeps its own. Closing twice is harmless.
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
            direction: Direction::Input,
        });
    }
}

impl<D: Driver> Labelled for Input<D> {
    fn set_index(&mut self, index: u8) {
        self.index = Some(index);
    }
}

impl<D: Driver> Drop for Input<D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: Driver> ErrorType for Input<D> {
    type Error = Error;
}

impl<D: Driver> InputPin for Input<D> {
    fn is_high(&mut self) -> Result<bool> {
        self.read()
    }

    fn is_low(&mut self) -> Result<bool> {
        self.is_off()
    }
}
