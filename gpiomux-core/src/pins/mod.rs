//! 40-pin header map
//!
//! Header pins are the physical connector numbers user code works with.
//! Controller pins are the BCM numbers the register driver works with.

pub mod header;
pub mod pinout;
pub mod translator;

pub use header::{classify, PinRole, GPIO_PINS, HEADER_PINS, PWM_PINS};
pub use pinout::{PinoutGroup, PINOUT};
pub use translator::PinTranslator;
