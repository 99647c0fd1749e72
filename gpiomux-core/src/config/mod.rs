//! Options and board description

pub mod board;
pub mod options;

pub use board::BoardModel;
pub use options::{DuplicateCheck, GpioOptions, Indexing, PinRequest, DEFAULT_POLL_INTERVAL_MS};
