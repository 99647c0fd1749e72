//! Board model detection

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gpiomux_core::BoardModel;

/// Default location of the CPU info file
pub const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Classify the board from the contents of `/proc/cpuinfo`
///
/// Looks at the first `Model` line; anything without one is `Unknown`.
pub fn parse_cpuinfo(text: &str) -> BoardModel {
    text.lines()
        .find(|line| line.starts_with("Model"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, model)| BoardModel::from_model_line(model.trim()))
        .unwrap_or_default()
}

/// Read and classify a CPU info file
pub fn read_model(path: &Path) -> Result<BoardModel> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_cpuinfo(&text))
}

/// Detect the running board
///
/// Falls back to `Unknown`, which assumes a newer board, when the file
/// cannot be read.
pub fn detect_model() -> BoardModel {
    match read_model(Path::new(CPUINFO_PATH)) {
        Ok(model) => model,
        Err(e) => {
            log::warn!("board detection failed: {:#}", e);
            BoardModel::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PI4: &str = "processor\t: 0\nBogoMIPS\t: 108.00\n\nHardware\t: BCM2835\nRevision\t: c03111\nModel\t\t: Raspberry Pi 4 Model B Rev 1.1\n";

    #[test]
    fn test_parse_pi4() {
        assert_eq!(parse_cpuinfo(PI4), BoardModel::Pi4);
    }

    #[test]
    fn test_parse_zero2_before_zero() {
        let text = "Model\t\t: Raspberry Pi Zero 2 W Rev 1.0\n";
        assert_eq!(parse_cpuinfo(text), BoardModel::PiZero2);
        let text = "Model\t\t: Raspberry Pi Zero W Rev 1.1\n";
        assert_eq!(parse_cpuinfo(text), BoardModel::PiZeroOr1);
    }

    #[test]
    fn test_parse_missing_model() {
        assert_eq!(parse_cpuinfo("processor\t: 0\n"), BoardModel::Unknown);
        assert_eq!(parse_cpuinfo(""), BoardModel::Unknown);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_model(Path::new("/nonexistent/cpuinfo")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/cpuinfo"));
    }
}
