//! Register window lifecycle
//!
//! The GPIO block can be mapped on its own through `/dev/gpiomem` without
//! root. PWM, the clock manager, BSC and SPI need the full peripheral
//! window from `/dev/mem`. A process commits to one of the two.

/// Register window to map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Window {
    /// GPIO registers only (`/dev/gpiomem`)
    Restricted,
    /// Whole peripheral range (`/dev/mem`)
    Full,
}

/// Failure to map a register window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessFault {
    /// Device node exists but cannot be opened (usually needs root)
    PermissionDenied,
    /// Device node does not exist on this system
    DeviceMissing,
    /// `mmap` of a register block failed
    MapFailed,
}

impl AccessFault {
    /// Human readable reason
    pub const fn reason(self) -> &'static str {
        match self {
            AccessFault::PermissionDenied => "permission denied",
            AccessFault::DeviceMissing => "device node missing",
            AccessFault::MapFailed => "register map failed",
        }
    }
}

/// Register window control
pub trait AccessWindow {
    /// Map the given window
    ///
    /// Called once per process by the board context, on the first
    /// successful peripheral claim.
    fn open_window(&mut self, window: Window) -> Result<(), AccessFault>;

    /// Unmap whatever window is open
    fn close_window(&mut self);
}
