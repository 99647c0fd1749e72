//! Board-agnostic core logic for gpiomux
//!
//! This crate holds everything that decides *whether* a pin or peripheral
//! may be used, without touching registers itself:
//!
//! - Header to controller pin translation and the pinout tables
//! - Register access mode arbitration (restricted vs. full window)
//! - Open pin registry with duplicate detection
//! - Watch/timer scheduler driving edge detection and delayed writes
//! - Options and board model types
//! - The error taxonomy shared by every gpiomux crate

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod arbiter;
pub mod config;
pub mod error;
pub mod pins;
pub mod registry;
pub mod scheduler;

pub use arbiter::{AccessMode, ArbitrationPolicy, Claim, ModeArbiter, PeripheralKind};
pub use config::{BoardModel, DuplicateCheck, GpioOptions, Indexing, PinRequest};
pub use error::{ArgumentFault, Error, ErrorKind, PinFault, Result};
pub use pins::PinTranslator;
pub use registry::{PinRegistry, Registration};
pub use scheduler::{Dispatch, Edge, PinLevels, Scheduler};
