//! Sysfs export probe
//!
//! A pin exported through `/sys/class/gpio` is probably driven by another
//! program. The check is advisory only.

/// Probe query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeError;

/// Checks whether a controller pin is claimed outside this process
pub trait ExportProbe {
    /// True if the pin is exported through sysfs
    fn is_exported(&self, pin: u8) -> Result<bool, ProbeError>;
}

/// Probe that never reports a claim
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl ExportProbe for NoProbe {
    fn is_exported(&self, _pin: u8) -> Result<bool, ProbeError> {
        Ok(false)
    }
}
