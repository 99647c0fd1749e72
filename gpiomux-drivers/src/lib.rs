//! Pin and peripheral handles
//!
//! A [`Board`] owns the register driver together with the translator,
//! arbiter, registry and scheduler from `gpiomux-core`. Every handle it
//! hands out shares that context:
//!
//! - [`Input`] / [`Output`]: one digital header pin
//! - [`PinGroup`]: several pins opened by one request
//! - [`Pwm`], [`I2c`], [`Spi`]: peripherals on the full register window
//!
//! Handles implement the matching `embedded-hal` 1.0 traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod board;
pub mod gpio;
pub mod i2c;
pub mod pwm;
pub mod spi;

pub use board::{Board, BoardConfig};
pub use gpio::{Input, Output, PinGroup, MAX_DELAY_MS, MAX_GROUP_PINS};
pub use i2c::I2c;
pub use pwm::{Pwm, PwmSetup};
pub use spi::Spi;
