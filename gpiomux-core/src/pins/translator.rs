//! Header to controller pin translation
//!
//! The table never changes, but translations are memoized per header pin
//! so repeated opens skip the lookup.

use super::header::{self, GPIO_PINS, HEADER_PINS, PWM_PINS};
use crate::error::{PinFault, Result};

/// Memoizing pin translator
#[derive(Debug, Clone)]
pub struct PinTranslator {
    cache: [Option<u8>; HEADER_PINS as usize + 1],
}

impl Default for PinTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl PinTranslator {
    /// Create a translator with an empty cache
    pub const fn new() -> Self {
        Self {
            cache: [None; HEADER_PINS as usize + 1],
        }
    }

    /// Translate a header pin to its controller pin
    ///
    /// Fails with `InvalidPin` for ground, supply and out-of-range pins.
    pub fn translate(&mut self, header: u8) -> Result<u8> {
        if let Some(Some(bcm)) = self.cache.get(header as usize) {
            return Ok(*bcm);
        }
        let bcm = header::lookup(header)?;
        self.cache[header as usize] = Some(bcm);
        Ok(bcm)
    }

    /// Translate a header pin that must be routed to a PWM channel
    pub fn translate_pwm(&mut self, header: u8) -> Result<u8> {
        let bcm = self.translate(header)?;
        if !PWM_PINS.contains(&header) {
            return Err(PinFault::NotPwm(header).into());
        }
        Ok(bcm)
    }

    /// Cached translation, if this pin was translated before
    pub fn cached(&self, header: u8) -> Option<u8> {
        self.cache.get(header as usize).copied().flatten()
    }

    /// True if the header pin can be opened as GPIO
    pub fn is_valid(header: u8) -> bool {
        header::lookup(header).is_ok()
    }

    /// All header pins that can be opened as GPIO
    pub fn valid_pins() -> &'static [u8] {
        &GPIO_PINS
    }
}
