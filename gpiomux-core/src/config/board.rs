//! Board model
//!
//! The peripheral base address and core clock depend on the SoC. They are
//! picked from the `Model` line of `/proc/cpuinfo`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raspberry Pi family with a 40-pin header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BoardModel {
    /// Pi Zero, Zero W, Pi 1 A+/B+ (BCM2835)
    PiZeroOr1,
    /// Pi Zero 2 W (RP3A0)
    PiZero2,
    /// Pi 2 (BCM2836)
    Pi2,
    /// Pi 3 (BCM2837)
    Pi3,
    /// Compute Module 3
    ComputeModule3,
    /// Pi 4 (BCM2711)
    Pi4,
    /// Pi 400
    Pi400,
    /// Compute Module 4
    ComputeModule4,
    /// Anything else; assumed to be a newer board
    #[default]
    Unknown,
}

impl BoardModel {
    /// Classify the text after `Model :` in `/proc/cpuinfo`
    pub fn from_model_line(line: &str) -> Self {
        // Order matters: "Pi Zero 2" also contains "Pi Zero".
        // Pi 1 A+/B+ report "Raspberry Pi Model B Plus" with no number.
        if line.contains("Pi Zero 2") {
            BoardModel::PiZero2
        } else if line.contains("Pi Zero") || line.contains("Pi 1") || line.contains("Pi Model") {
            BoardModel::PiZeroOr1
        } else if line.contains("Pi 2") {
            BoardModel::Pi2
        } else if line.contains("Pi 3") {
            BoardModel::Pi3
        } else if line.contains("Compute Module 3") {
            BoardModel::ComputeModule3
        } else if line.contains("Pi 400") {
            BoardModel::Pi400
        } else if line.contains("Pi 4") {
            BoardModel::Pi4
        } else if line.contains("Compute Module 4") {
            BoardModel::ComputeModule4
        } else {
            BoardModel::Unknown
        }
    }

    /// Physical base address of the peripheral block
    pub const fn peripheral_base(self) -> u32 {
        match self {
            BoardModel::PiZeroOr1 => 0x2000_0000,
            BoardModel::PiZero2
            | BoardModel::Pi2
            | BoardModel::Pi3
            | BoardModel::ComputeModule3 => 0x3F00_0000,
            BoardModel::Pi4 | BoardModel::Pi400 | BoardModel::ComputeModule4 => 0xFE00_0000,
            BoardModel::Unknown => 0xFE00_0000,
        }
    }

    /// Core (VPU) clock feeding the BSC and SPI dividers, in Hz
    ///
    /// 250 MHz on BCM2835 and BCM2836 boards, 400 MHz on Pi 3 class and
    /// newer.
    pub const fn core_clock_hz(self) -> u32 {
        match self {
            BoardModel::PiZeroOr1 | BoardModel::Pi2 => 250_000_000,
            BoardModel::PiZero2
            | BoardModel::Pi3
            | BoardModel::ComputeModule3
            | BoardModel::Pi4
            | BoardModel::Pi400
            | BoardModel::ComputeModule4
            | BoardModel::Unknown => 400_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_lines() {
        let cases = [
            ("Raspberry Pi Zero W Rev 1.1", BoardModel::PiZeroOr1),
            ("Raspberry Pi Model B Plus Rev 1.2", BoardModel::PiZeroOr1),
            ("Raspberry Pi Model A Plus Rev 1.1", BoardModel::PiZeroOr1),
            ("Raspberry Pi 2 Model B Rev 1.1", BoardModel::Pi2),
            ("Raspberry Pi Zero 2 W Rev 1.0", BoardModel::PiZero2),
            ("Raspberry Pi 3 Model B Plus Rev 1.3", BoardModel::Pi3),
            ("Raspberry Pi Compute Module 3 Plus Rev 1.0", BoardModel::ComputeModule3),
            ("Raspberry Pi 4 Model B Rev 1.4", BoardModel::Pi4),
            ("Raspberry Pi 400 Rev 1.0", BoardModel::Pi400),
            ("Raspberry Pi Compute Module 4 Rev 1.0", BoardModel::ComputeModule4),
            ("Raspberry Pi 5 Model B Rev 1.0", BoardModel::Unknown),
        ];
        for (line, model) in cases {
            assert_eq!(BoardModel::from_model_line(line), model, "{}", line);
        }
    }

    #[test]
    fn test_clock_and_base() {
        assert_eq!(BoardModel::PiZeroOr1.core_clock_hz(), 250_000_000);
        assert_eq!(BoardModel::PiZeroOr1.peripheral_base(), 0x2000_0000);
        assert_eq!(BoardModel::PiZero2.peripheral_base(), 0x3F00_0000);
        assert_eq!(BoardModel::Pi4.core_clock_hz(), 400_000_000);
        assert_eq!(BoardModel::Pi3.core_clock_hz(), 400_000_000);
        assert_eq!(BoardModel::Pi2.core_clock_hz(), 250_000_000);
        assert_eq!(BoardModel::Pi2.peripheral_base(), 0x3F00_0000);
        assert_eq!(BoardModel::Unknown.peripheral_base(), 0xFE00_0000);
    }
}
