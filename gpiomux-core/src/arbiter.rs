//! Register access mode arbitration
//!
//! GPIO alone can run on the restricted `/dev/gpiomem` window. PWM, I2C and
//! SPI need the full peripheral window. A process commits to one of them
//! with its first successful peripheral open, and every later open must
//! agree with that choice.
//!
//! # Claim sequence
//!
//! ```text
//! check(kind) ──► Latched(window) ──► driver.open_window(window) ──► latch(kind)
//!            └──► Held (mode already compatible, nothing to do)
//!            └──► ModeConflict
//! ```
//!
//! The arbiter only latches once the window is actually open, so a failed
//! open leaves it uninitialized.

use core::fmt;

use gpiomux_hal::Window;

use crate::error::{Error, Result};

/// Committed register access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessMode {
    /// Nothing opened yet
    #[default]
    Uninitialized,
    /// Restricted GPIO-only window
    Light,
    /// Full peripheral window
    Full,
}

/// Peripheral domain competing for the register window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralKind {
    Gpio,
    Pwm,
    I2c,
    Spi,
}

impl PeripheralKind {
    /// Access mode this peripheral needs
    pub const fn required_mode(self) -> AccessMode {
        match self {
            PeripheralKind::Gpio => AccessMode::Light,
            PeripheralKind::Pwm | PeripheralKind::I2c | PeripheralKind::Spi => AccessMode::Full,
        }
    }

    /// Register window backing the required mode
    pub const fn window(self) -> Window {
        match self.required_mode() {
            AccessMode::Full => Window::Full,
            _ => Window::Restricted,
        }
    }

    /// Short name of the required window
    pub const fn window_name(self) -> &'static str {
        match self.window() {
            Window::Restricted => "restricted",
            Window::Full => "full",
        }
    }
}

impl fmt::Display for PeripheralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PeripheralKind::Gpio => "GPIO",
            PeripheralKind::Pwm => "PWM",
            PeripheralKind::I2c => "I2C",
            PeripheralKind::Spi => "SPI",
        })
    }
}

/// How the committed mode behaves once peripherals close
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArbitrationPolicy {
    /// First claimant wins for the life of the board context
    #[default]
    Sticky,
}

/// Outcome of a successful claim check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Claim {
    /// First claim: the caller must open this window, then call `latch`
    Latched(Window),
    /// Mode already committed and compatible
    Held,
}

/// Access mode arbiter
#[derive(Debug, Clone, Default)]
pub struct ModeArbiter {
    mode: AccessMode,
    owner: Option<PeripheralKind>,
    policy: ArbitrationPolicy,
}

impl ModeArbiter {
    /// Create an uninitialized arbiter
    pub const fn new() -> Self {
        Self {
            mode: AccessMode::Uninitialized,
            owner: None,
            policy: ArbitrationPolicy::Sticky,
        }
    }

    /// Committed mode
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Peripheral kind that committed the mode
    pub fn owner(&self) -> Option<PeripheralKind> {
        self.owner
    }

    /// Active policy
    pub fn policy(&self) -> ArbitrationPolicy {
        self.policy
    }

    /// Check whether `kind` may use the register window
    ///
    /// Does not change state. A `Latched` answer means nothing is
    /// committed yet and the caller has to open the window first.
    pub fn check(&self, kind: PeripheralKind) -> Result<Claim> {
        let wanted = kind.required_mode();
        match (self.mode, self.owner) {
            (AccessMode::Uninitialized, _) | (_, None) => Ok(Claim::Latched(kind.window())),
            (mode, Some(_)) if mode == wanted => Ok(Claim::Held),
            (_, Some(owner)) => Err(Error::ModeConflict {
                requested: kind,
                owner,
            }),
        }
    }

    /// Commit the mode required by `kind`
    ///
    /// Has no effect once a mode is committed.
    pub fn latch(&mut self, kind: PeripheralKind) {
        if self.mode == AccessMode::Uninitialized {
            self.mode = kind.required_mode();
            self.owner = Some(kind);
            log::debug!("{} committed the {} window", kind, kind.window_name());
        }
    }

    /// Check and commit in one step, for callers with no window to open
    pub fn claim(&mut self, kind: PeripheralKind) -> Result<Claim> {
        let claim = self.check(kind)?;
        if let Claim::Latched(_) = claim {
            self.latch(kind);
        }
        Ok(claim)
    }

    /// Forget the committed mode
    ///
    /// Escape hatch for test harnesses; the hardware window is not touched.
    pub fn reset(&mut self) {
        self.mode = AccessMode::Uninitialized;
        self.owner = None;
    }
}
