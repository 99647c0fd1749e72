//! Digital I/O handles

mod group;
mod input;
mod output;

pub use group::{PinGroup, MAX_GROUP_PINS};
pub use input::Input;
pub use output::Output;

use gpiomux_core::{ArgumentFault, DuplicateCheck, Error, GpioOptions, Indexing, PinRegistry};
use gpiomux_core::scheduler::Owner;
use gpiomux_core::{PinRequest, Result};
use gpiomux_hal::{Direction, Driver};

use crate::board::Board;

/// Longest delay accepted by timed writes (one hour)
pub const MAX_DELAY_MS: u32 = 3_600_000;

pub(crate) fn check_delay(delay_ms: u32) -> Result<()> {
    if delay_ms > MAX_DELAY_MS {
        return Err(ArgumentFault::Delay.into());
    }
    Ok(())
}

impl<D: Driver> Board<D> {
    /// Open one input pin with the board defaults
    pub fn input(&self, pin: u8) -> Result<Input<D>> {
        self.input_with(pin, self.defaults())
    }

    /// Open one input pin with explicit options
    pub fn input_with(&self, pin: u8, options: GpioOptions) -> Result<Input<D>> {
        let (bcm, session, owner) = self.with(|st| -> Result<(u8, u32, Owner)> {
            let bcm = st.open_pin(pin, Direction::Input, &options)?;
            Ok((bcm, st.session, st.next_owner()))
        })?;
        Ok(Input::new(self.clone(), pin, bcm, session, owner, options))
    }

    /// Open one output pin with the board defaults
    pub fn output(&self, pin: u8) -> Result<Output<D>> {
        self.output_with(pin, self.defaults())
    }

    /// Open one output pin with explicit options
    pub fn output_with(&self, pin: u8, options: GpioOptions) -> Result<Output<D>> {
        let (bcm, session, owner) = self.with(|st| -> Result<(u8, u32, Owner)> {
            let bcm = st.open_pin(pin, Direction::Output, &options)?;
            Ok((bcm, st.session, st.next_owner()))
        })?;
        Ok(Output::new(self.clone(), pin, bcm, session, owner, options))
    }

    /// Open every requested pin as an input
    ///
    /// All or nothing: if any pin fails, the pins already opened by this
    /// call are closed again.
    pub fn inputs(&self, request: impl Into<PinRequest>) -> Result<PinGroup<Input<D>>> {
        let request = request.into();
        let options = request.options().copied().unwrap_or(self.defaults());
        self.open_group(request.pins(), options, |pin| {
            self.input_with(pin, options)
        })
    }

    /// Open every requested pin as an output
    pub fn outputs(&self, request: impl Into<PinRequest>) -> Result<PinGroup<Output<D>>> {
        let request = request.into();
        let options = request.options().copied().unwrap_or(self.defaults());
        self.open_group(request.pins(), options, |pin| {
            self.output_with(pin, options)
        })
    }

    fn open_group<H: Labelled>(
        &self,
        pins: &[u8],
        options: GpioOptions,
        mut open: impl FnMut(u8) -> Result<H>,
    ) -> Result<PinGroup<H>> {
        if pins.is_empty() || pins.len() > MAX_GROUP_PINS {
            return Err(ArgumentFault::PinList.into());
        }
        // Reject bad pins before touching hardware
        self.with(|st| -> Result<()> {
            for &pin in pins {
                st.translator.translate(pin)?;
            }
            Ok(())
        })?;
        let check = options
            .duplicate_check
            .unwrap_or(self.with(|st| st.registry.check()));
        if check == DuplicateCheck::Strict {
            if let Some(pin) = PinRegistry::scan_duplicates(pins) {
                return Err(Error::DuplicatePin(pin));
            }
        }

        let mut group = PinGroup::new(options.indexing);
        for (position, &pin) in pins.iter().enumerate() {
            let mut handle = open(pin)?;
            let label = match options.indexing {
                Indexing::Sequential => position as u8,
                Indexing::Pin => pin,
            };
            handle.set_index(label);
            group.push(label, handle);
        }
        Ok(group)
    }
}

/// Handles that carry a group index label
pub(crate) trait Labelled {
    fn set_index(&mut self, index: u8);
}
