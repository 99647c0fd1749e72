//! Named pin groups for diagnostics

/// A named group of header pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinoutGroup {
    /// Group name
    pub name: &'static str,
    /// Signal name and header pin
    pub pins: &'static [(&'static str, u8)],
}

/// Peripheral groups of the 40-pin header
pub const PINOUT: [PinoutGroup; 5] = [
    PinoutGroup {
        name: "uart",
        pins: &[("txd", 8), ("rxd", 10)],
    },
    PinoutGroup {
        name: "i2c",
        pins: &[("sda1", 3), ("scl1", 5), ("sda0", 27), ("scl0", 28)],
    },
    PinoutGroup {
        name: "pwm",
        pins: &[("pwm0", 12), ("pwm0", 32), ("pwm1", 33), ("pwm1", 35)],
    },
    PinoutGroup {
        name: "spi",
        pins: &[
            ("mosi", 19),
            ("miso", 21),
            ("sclk", 23),
            ("cs0", 24),
            ("cs1", 26),
        ],
    },
    PinoutGroup {
        name: "eeprom",
        pins: &[("id_sd", 27), ("id_sc", 28)],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::PinTranslator;

    #[test]
    fn test_every_group_pin_is_gpio() {
        for group in PINOUT.iter() {
            for (_, pin) in group.pins {
                assert!(PinTranslator::is_valid(*pin), "{} {}", group.name, pin);
            }
        }
    }
}
