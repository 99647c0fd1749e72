//! Pin request and option types
//!
//! A pin request is decided once at the API boundary: a single pin, a
//! list of pins, or a list with options.

use alloc::vec::Vec;

use gpiomux_hal::Pull;

use crate::scheduler::Edge;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Poll interval used when a watch does not name one
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 100;

/// What to do when a pin is opened twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DuplicateCheck {
    /// Log a warning and open the pin anyway
    #[default]
    Warn,
    /// Refuse to open the pin
    Strict,
    /// Do not look
    Off,
}

/// How a pin group is indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Indexing {
    /// 0, 1, 2 in request order
    #[default]
    Sequential,
    /// By header pin number
    Pin,
}

/// Options applied to every pin of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GpioOptions {
    /// Edge filter used by `watch_all` and watches without an explicit edge
    pub edge: Edge,
    /// Poll interval for watches (None = default)
    pub poll_interval_ms: Option<u32>,
    /// Pull resistor applied to inputs
    pub pull: Pull,
    /// Initial level of outputs
    pub initial_level: bool,
    /// Group indexing scheme
    pub indexing: Indexing,
    /// Duplicate pin policy (None = board default)
    pub duplicate_check: Option<DuplicateCheck>,
}

impl Default for GpioOptions {
    fn default() -> Self {
        Self {
            edge: Edge::Both,
            poll_interval_ms: None,
            pull: Pull::None,
            initial_level: false,
            indexing: Indexing::Sequential,
            duplicate_check: None,
        }
    }
}

impl GpioOptions {
    /// Set the pull resistor
    pub fn with_pull(mut self, pull: Pull) -> Self {
        self.pull = pull;
        self
    }

    /// Set the indexing scheme
    pub fn with_indexing(mut self, indexing: Indexing) -> Self {
        self.indexing = indexing;
        self
    }

    /// Set the duplicate pin policy
    pub fn with_duplicate_check(mut self, check: DuplicateCheck) -> Self {
        self.duplicate_check = Some(check);
        self
    }

    /// Set the output initial level
    pub fn with_initial_level(mut self, high: bool) -> Self {
        self.initial_level = high;
        self
    }

    /// Set the watch edge and poll interval
    pub fn with_watch(mut self, edge: Edge, poll_interval_ms: Option<u32>) -> Self {
        self.edge = edge;
        self.poll_interval_ms = poll_interval_ms;
        self
    }
}

/// Pins to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinRequest {
    /// One pin
    Single(u8),
    /// Several pins with default options
    List(Vec<u8>),
    /// Several pins with explicit options
    ListWithOptions(Vec<u8>, GpioOptions),
}

impl PinRequest {
    /// Requested pins in order
    pub fn pins(&self) -> &[u8] {
        match self {
            PinRequest::Single(pin) => core::slice::from_ref(pin),
            PinRequest::List(pins) | PinRequest::ListWithOptions(pins, _) => pins,
        }
    }

    /// Options for this request, if any were given
    pub fn options(&self) -> Option<&GpioOptions> {
        match self {
            PinRequest::ListWithOptions(_, options) => Some(options),
            _ => None,
        }
    }
}

impl From<u8> for PinRequest {
    fn from(pin: u8) -> Self {
        PinRequest::Single(pin)
    }
}

impl From<&[u8]> for PinRequest {
    fn from(pins: &[u8]) -> Self {
        PinRequest::List(pins.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for PinRequest {
    fn from(pins: [u8; N]) -> Self {
        PinRequest::List(pins.to_vec())
    }
}

impl From<(Vec<u8>, GpioOptions)> for PinRequest {
    fn from((pins, options): (Vec<u8>, GpioOptions)) -> Self {
        PinRequest::ListWithOptions(pins, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_pins() {
        assert_eq!(PinRequest::from(11).pins(), &[11]);
        assert_eq!(PinRequest::from([11, 13]).pins(), &[11, 13]);
        let req = PinRequest::from((alloc::vec![3, 5], GpioOptions::default()));
        assert_eq!(req.pins(), &[3, 5]);
        assert!(req.options().is_some());
        assert!(PinRequest::from(3).options().is_none());
    }

    #[test]
    fn test_option_builders() {
        let opts = GpioOptions::default()
            .with_pull(Pull::Up)
            .with_indexing(Indexing::Pin)
            .with_duplicate_check(DuplicateCheck::Strict);
        assert_eq!(opts.pull, Pull::Up);
        assert_eq!(opts.indexing, Indexing::Pin);
        assert_eq!(opts.duplicate_check, Some(DuplicateCheck::Strict));
        assert_eq!(opts.edge, Edge::Both);
    }
}
