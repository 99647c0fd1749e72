//! gpiomux: Raspberry Pi 40-pin header access
//!
//! Host-side facade over the `no_std` crates. It adds what needs an
//! operating system:
//!
//! - Board model detection from `/proc/cpuinfo`
//! - The sysfs export probe
//! - TOML configuration
//! - A real-time run loop for watches and timed writes
//! - Blocking waits and the pinout listing
//!
//! ```text
//!           ┌──────────────────────┐
//!           │       gpiomux        │  config, run loop, sysfs
//!           └──────────┬───────────┘
//!           ┌──────────▼───────────┐
//!           │   gpiomux-drivers    │  Board, Input, Output, Pwm, I2c, Spi
//!           └──────────┬───────────┘
//!           ┌──────────▼───────────┐
//!           │     gpiomux-core     │  translation, arbitration, scheduler
//!           └──────────┬───────────┘
//!           ┌──────────▼───────────┐
//!           │     gpiomux-hal      │  register driver traits
//!           └──────────────────────┘
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod delay;
pub mod pinout;
pub mod runtime;
pub mod sysfs;
pub mod system;

use gpiomux_hal::Driver;

pub use config::Config;
pub use delay::{wait_ms, wait_us, StdDelay};
pub use pinout::{list_pinout, log_pinout};
pub use runtime::{run_for, run_until};
pub use sysfs::SysfsProbe;
pub use system::{detect_model, parse_cpuinfo};

pub use gpiomux_core::{
    AccessMode, BoardModel, DuplicateCheck, Edge, Error, ErrorKind, GpioOptions, Indexing,
    PeripheralKind, PinRequest, Result,
};
pub use gpiomux_drivers::{
    Board, BoardConfig, I2c, Input, Output, PinGroup, Pwm, PwmSetup, Spi,
};
pub use gpiomux_hal::{I2cConfig, Mode, PinSet, Pull};
pub use gpiomux_hal_sim::SimBoard;

/// Create a board context for the running machine
///
/// Uses the model from `config` if set, otherwise detects it, and installs
/// the sysfs export probe.
pub fn open<D: Driver>(driver: D, config: &Config) -> anyhow::Result<Board<D>> {
    let model = config.board.model.unwrap_or_else(detect_model);
    log::info!("board model: {:?}", model);
    let board = Board::with_config(driver, config.board_config(model))
        .map_err(|e| anyhow::anyhow!("invalid board configuration: {}", e))?;
    Ok(board.with_probe(SysfsProbe::default()))
}

/// Treat register access failures as fatal
pub trait OpenOrExit<T> {
    /// Exit the process if the register window could not be opened
    ///
    /// Any other error is handed back to the caller.
    fn open_or_exit(self) -> Result<T>;
}

impl<T> OpenOrExit<T> for Result<T> {
    fn open_or_exit(self) -> Result<T> {
        match self {
            Err(err @ Error::HardwareAccess(_)) => {
                log::error!("{}", err);
                eprintln!("gpiomux: {}", err);
                eprintln!("gpiomux: the full register window needs root, GPIO alone needs /dev/gpiomem access");
                std::process::exit(1);
            }
            other => other,
        }
    }
}

/// True if `err` means the register window is unavailable
pub fn is_fatal(err: &Error) -> bool {
    err.kind() == ErrorKind::HardwareAccess
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_access_errors_pass_through() {
        let result: Result<()> = Err(Error::DuplicatePin(11));
        assert_eq!(result.open_or_exit(), Err(Error::DuplicatePin(11)));
        let ok: Result<u8> = Ok(3);
        assert_eq!(ok.open_or_exit(), Ok(3));
    }

    #[test]
    fn test_is_fatal() {
        assert!(is_fatal(&Error::HardwareAccess(
            gpiomux_hal::AccessFault::PermissionDenied
        )));
        assert!(!is_fatal(&Error::DuplicatePin(3)));
    }

    #[test]
    fn test_open_with_model_override() {
        let config = Config::from_toml_str("[board]\nmodel = \"pi3\"\n").unwrap();
        let board = open(SimBoard::new(), &config).unwrap();
        assert_eq!(board.model(), BoardModel::Pi3);
    }
}
