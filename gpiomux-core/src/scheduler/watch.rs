//! Watch entries

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use super::edge::Edge;
use super::timer::Owner;

/// Edge callback, receives `(level, header_pin)`
///
/// Shared so one callback can serve every pin of an aggregate watch.
pub type EdgeCallback = Rc<RefCell<dyn FnMut(bool, u8)>>;

/// Wrap a closure as an [`EdgeCallback`]
pub fn edge_callback(f: impl FnMut(bool, u8) + 'static) -> EdgeCallback {
    Rc::new(RefCell::new(f))
}

/// Who armed a watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchOrigin {
    /// `Input::watch`
    Single,
    /// `Board::watch_all`
    Aggregate,
}

/// Armed edge detector for one pin
pub struct WatchEntry {
    pub(crate) pin: u8,
    pub(crate) owner: Owner,
    pub(crate) edge: Edge,
    pub(crate) interval_ms: u32,
    pub(crate) last_state: bool,
    pub(crate) next_due: u64,
    pub(crate) origin: WatchOrigin,
    pub(crate) callback: EdgeCallback,
}

impl WatchEntry {
    /// Header pin
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Handle that armed it
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Edge filter
    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Poll interval
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Origin
    pub fn origin(&self) -> WatchOrigin {
        self.origin
    }

    /// Record a sample; returns the level if it is a reportable edge
    pub(crate) fn sample(&mut self, level: bool) -> Option<bool> {
        if level == self.last_state {
            return None;
        }
        self.last_state = level;
        self.edge.accepts(level).then_some(level)
    }

    /// Move the due time past `now`
    pub(crate) fn reschedule(&mut self, now: u64) {
        self.next_due += u64::from(self.interval_ms);
        if self.next_due <= now {
            self.next_due = now + u64::from(self.interval_ms);
        }
    }
}

impl fmt::Debug for WatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchEntry")
            .field("pin", &self.pin)
            .field("owner", &self.owner)
            .field("edge", &self.edge)
            .field("interval_ms", &self.interval_ms)
            .field("last_state", &self.last_state)
            .field("next_due", &self.next_due)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
