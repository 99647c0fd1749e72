//! gpiomux Hardware Abstraction Layer
//!
//! This crate defines the register driver boundary: the small set of
//! register operations the pin and peripheral handles need from the SoC.
//! A memory-mapped implementation lives outside this workspace; the
//! `gpiomux-hal-sim` crate provides an in-memory one.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  gpiomux / gpiomux-drivers (handles)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gpiomux-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ gpiomux-hal-  │       │  mmap driver  │
//! │     sim       │       │  (external)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! All pin numbers crossing this boundary are controller (BCM) numbers.
//!
//! # Traits
//!
//! - [`access::AccessWindow`] - Register window lifecycle
//! - [`gpio::GpioRegisters`] - Digital I/O
//! - [`pwm::PwmRegisters`] - PWM channels and clock
//! - [`i2c::I2cRegisters`] - BSC (I2C) master
//! - [`spi::SpiRegisters`] - SPI0 master
//! - [`probe::ExportProbe`] - Sysfs export check

#![no_std]
#![deny(unsafe_code)]

pub mod access;
pub mod gpio;
pub mod i2c;
pub mod probe;
pub mod pwm;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use access::{AccessFault, AccessWindow, Window};
pub use gpio::{Direction, GpioRegisters, Pull};
pub use i2c::{I2cConfig, I2cFault, I2cRegisters, PinSet};
pub use probe::{ExportProbe, NoProbe, ProbeError};
pub use pwm::{PwmChannel, PwmRegisters};
pub use spi::{Mode, Phase, Polarity, SpiRegisters};

/// Complete register driver
///
/// Everything a board context needs from one backend.
pub trait Driver: AccessWindow + GpioRegisters + PwmRegisters + I2cRegisters + SpiRegisters {}

// Blanket implementation for types that implement every register trait
impl<T> Driver for T where
    T: AccessWindow + GpioRegisters + PwmRegisters + I2cRegisters + SpiRegisters
{
}
