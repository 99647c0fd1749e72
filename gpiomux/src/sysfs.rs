//! Sysfs export probe
//!
//! Warns when a pin is also exported through `/sys/class/gpio`, which
//! usually means another program drives it.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use gpiomux_hal::{ExportProbe, ProbeError};

/// Default sysfs GPIO class directory
pub const SYSFS_GPIO: &str = "/sys/class/gpio";

/// Looks for `gpio<N>` entries in a sysfs GPIO directory
#[derive(Debug, Clone)]
pub struct SysfsProbe {
    root: PathBuf,
}

impl SysfsProbe {
    /// Probe a different directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsProbe {
    fn default() -> Self {
        Self::with_root(SYSFS_GPIO)
    }
}

impl ExportProbe for SysfsProbe {
    fn is_exported(&self, pin: u8) -> Result<bool, ProbeError> {
        match fs::metadata(self.root.join(format!("gpio{}", pin))) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                log::debug!("sysfs probe for GPIO{}: {}", pin, e);
                Err(ProbeError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gpiomux-sysfs-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_exported_pin_detected() {
        let root = scratch("exported");
        fs::create_dir(root.join("gpio17")).unwrap();
        let probe = SysfsProbe::with_root(root.clone());
        assert_eq!(probe.is_exported(17), Ok(true));
        assert_eq!(probe.is_exported(27), Ok(false));
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_missing_root_is_not_exported() {
        let probe = SysfsProbe::with_root("/nonexistent/gpio");
        assert_eq!(probe.is_exported(4), Ok(false));
    }
}
