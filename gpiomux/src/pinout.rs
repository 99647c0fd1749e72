//! Pinout listing

use std::fmt::Write;

use gpiomux_core::pins::{PinTranslator, PINOUT};

/// Header pins by peripheral, plus every usable GPIO pin
pub fn list_pinout() -> String {
    let mut out = String::new();
    for group in PINOUT.iter() {
        let pins: Vec<String> = group
            .pins
            .iter()
            .map(|(signal, pin)| format!("{} {}", signal, pin))
            .collect();
        let _ = writeln!(out, "{:<7} {}", group.name, pins.join(", "));
    }
    let gpio: Vec<String> = PinTranslator::valid_pins()
        .iter()
        .map(u8::to_string)
        .collect();
    let _ = writeln!(out, "{:<7} {}", "gpio", gpio.join(", "));
    out
}

/// Log the pinout at info level
pub fn log_pinout() {
    for line in list_pinout().lines() {
        log::info!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing() {
        let text = list_pinout();
        assert!(text.contains("pwm     pwm0 12, pwm0 32, pwm1 33, pwm1 35"));
        assert!(text.lines().any(|l| l.starts_with("i2c")));
        let gpio = text.lines().last().unwrap();
        assert!(gpio.starts_with("gpio"));
        assert!(gpio.contains("40"));
        assert!(!gpio.contains(" 6,"));
    }
}
