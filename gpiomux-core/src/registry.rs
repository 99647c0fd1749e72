//! Open pin registry
//!
//! Tracks every open digital pin with its direction. The registry is a
//! multiset: in permissive mode a pin may be open twice, and closing one
//! handle leaves the other registered.

use alloc::vec::Vec;

use gpiomux_hal::Direction;

use crate::config::DuplicateCheck;
use crate::error::{Error, Result};

/// Outcome of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Registration {
    /// Pin was not open before
    Fresh,
    /// Pin was already open; registered anyway
    Duplicate(u8),
}

/// Registry of open header pins
#[derive(Debug, Clone, Default)]
pub struct PinRegistry {
    entries: Vec<(u8, Direction)>,
    check: DuplicateCheck,
}

impl PinRegistry {
    /// Create an empty registry with the given default duplicate policy
    pub fn new(check: DuplicateCheck) -> Self {
        Self {
            entries: Vec::new(),
            check,
        }
    }

    /// Default duplicate policy
    pub fn check(&self) -> DuplicateCheck {
        self.check
    }

    /// Change the default duplicate policy
    pub fn set_check(&mut self, check: DuplicateCheck) {
        self.check = check;
    }

    /// Register a pin under the default policy
    pub fn register(&mut self, pin: u8, direction: Direction) -> Result<Registration> {
        self.register_with(pin, direction, self.check)
    }

    /// Register a pin under an explicit policy
    pub fn register_with(
        &mut self,
        pin: u8,
        direction: Direction,
        check: DuplicateCheck,
    ) -> Result<Registration> {
        let registration = match check {
            DuplicateCheck::Off => Registration::Fresh,
            _ if self.contains(pin) => {
                if check == DuplicateCheck::Strict {
                    return Err(Error::DuplicatePin(pin));
                }
                log::warn!("pin {} is already in use", pin);
                Registration::Duplicate(pin)
            }
            _ => Registration::Fresh,
        };
        self.entries.push((pin, direction));
        Ok(registration)
    }

    /// Remove one entry for `pin`, whatever its direction
    ///
    /// Returns false if the pin was not registered.
    pub fn unregister(&mut self, pin: u8) -> bool {
        match self.entries.iter().rposition(|(p, _)| *p == pin) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove one entry for `pin`, preferring one with `direction`
    pub fn unregister_as(&mut self, pin: u8, direction: Direction) -> bool {
        match self
            .entries
            .iter()
            .rposition(|entry| *entry == (pin, direction))
        {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => self.unregister(pin),
        }
    }

    /// True if `pin` has at least one entry
    pub fn contains(&self, pin: u8) -> bool {
        self.entries.iter().any(|(p, _)| *p == pin)
    }

    /// Open input pins, each once, in registration order
    pub fn inputs(&self) -> Vec<u8> {
        let mut pins: Vec<u8> = Vec::new();
        for (pin, direction) in &self.entries {
            if *direction == Direction::Input && !pins.contains(pin) {
                pins.push(*pin);
            }
        }
        pins
    }

    /// Every entry in registration order
    pub fn iter(&self) -> impl Iterator<Item = (u8, Direction)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// First pin that appears twice in `pins`, comparing every pair
    pub fn scan_duplicates(pins: &[u8]) -> Option<u8> {
        for (i, a) in pins.iter().enumerate() {
            for b in &pins[i + 1..] {
                if a == b {
                    return Some(*a);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_register_fresh() {
        let mut reg = PinRegistry::default();
        assert_eq!(reg.register(11, Direction::Input), Ok(Registration::Fresh));
        assert!(reg.contains(11));
    }

    #[test]
    fn test_duplicate_warns_by_default() {
        let mut reg = PinRegistry::default();
        reg.register(11, Direction::Input).unwrap();
        assert_eq!(
            reg.register(11, Direction::Input),
            Ok(Registration::Duplicate(11))
        );
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_duplicate_across_directions() {
        let mut reg = PinRegistry::default();
        reg.register(11, Direction::Input).unwrap();
        assert_eq!(
            reg.register(11, Direction::Output),
            Ok(Registration::Duplicate(11))
        );
    }

    #[test]
    fn test_strict_fails_without_registering() {
        let mut reg = PinRegistry::new(DuplicateCheck::Strict);
        reg.register(11, Direction::Input).unwrap();
        assert_eq!(
            reg.register(11, Direction::Input),
            Err(Error::DuplicatePin(11))
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_off_skips_scan() {
        let mut reg = PinRegistry::new(DuplicateCheck::Off);
        reg.register(11, Direction::Input).unwrap();
        assert_eq!(reg.register(11, Direction::Input), Ok(Registration::Fresh));
    }

    #[test]
    fn test_unregister_one_of_two() {
        let mut reg = PinRegistry::default();
        reg.register(11, Direction::Input).unwrap();
        reg.register(11, Direction::Input).unwrap();
        assert!(reg.unregister(11));
        assert!(reg.contains(11));
        assert!(reg.unregister(11));
        assert!(!reg.contains(11));
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let mut reg = PinRegistry::default();
        assert!(!reg.unregister(7));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_unregister_as_prefers_direction() {
        let mut reg = PinRegistry::default();
        reg.register(11, Direction::Input).unwrap();
        reg.register(11, Direction::Output).unwrap();
        reg.unregister_as(11, Direction::Input);
        assert!(reg.inputs().is_empty());
        assert!(reg.contains(11));
    }

    #[test]
    fn test_inputs_deduplicated() {
        let mut reg = PinRegistry::default();
        reg.register(11, Direction::Input).unwrap();
        reg.register(13, Direction::Output).unwrap();
        reg.register(15, Direction::Input).unwrap();
        reg.register(11, Direction::Input).unwrap();
        assert_eq!(reg.inputs(), alloc::vec![11, 15]);
    }

    #[test]
    fn test_scan_duplicates_reports_first() {
        assert_eq!(PinRegistry::scan_duplicates(&[3, 5, 7]), None);
        assert_eq!(PinRegistry::scan_duplicates(&[3, 5, 7, 5, 3]), Some(3));
        assert_eq!(PinRegistry::scan_duplicates(&[]), None);
    }

    proptest! {
        #[test]
        fn prop_scan_matches_set_size(pins in proptest::collection::vec(1u8..=40, 0..12)) {
            let mut sorted = pins.clone();
            sorted.sort_unstable();
            sorted.dedup();
            let has_dup = sorted.len() != pins.len();
            prop_assert_eq!(PinRegistry::scan_duplicates(&pins).is_some(), has_dup);
        }
    }
}
