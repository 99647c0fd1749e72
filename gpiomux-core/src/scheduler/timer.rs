//! One-shot level timers

use alloc::boxed::Box;
use core::fmt;

/// Completion callback, receives the resulting level
pub type Completion = Box<dyn FnOnce(bool)>;

/// Handle of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(pub(crate) u32);

/// Handle that owns scheduled work
///
/// Closing a handle cancels the timers and watches it owns and nothing
/// else, so duplicate handles on one pin keep their own work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Owner(pub u32);

impl Owner {
    /// Work armed by the board itself (`watch_all`)
    pub const BOARD: Owner = Owner(0);
}

/// Delayed level write on one pin
pub(crate) struct Timer {
    pub(crate) id: TimerId,
    pub(crate) pin: u8,
    pub(crate) owner: Owner,
    pub(crate) due: u64,
    pub(crate) level: bool,
    pub(crate) completion: Option<Completion>,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("pin", &self.pin)
            .field("owner", &self.owner)
            .field("due", &self.due)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Level already read, waiting for the next pass to be delivered
pub(crate) struct Deferred {
    pub(crate) level: bool,
    pub(crate) callback: Completion,
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}
