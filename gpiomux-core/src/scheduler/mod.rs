//! Watch and timer scheduler
//!
//! Edge detection polls input levels on a virtual millisecond clock.
//! Delayed writes (`on_after`, `pulse`, ...) are one-shot timers on the same
//! clock. A pass returns the user callbacks it wants to run instead of
//! running them, so the caller can drop its borrows first.

pub mod edge;
pub mod executor;
pub mod timer;
pub mod watch;

pub use edge::Edge;
pub use executor::{Dispatch, PinLevels, Scheduler};
pub use timer::{Completion, Owner, TimerId};
pub use watch::{edge_callback, EdgeCallback, WatchOrigin};
