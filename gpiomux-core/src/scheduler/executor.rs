//! Scheduler pass
//!
//! One pass, at virtual time `now`:
//!
//! 1. Hand out levels queued by `defer` (async reads)
//! 2. Fire due timers in due order, driving their pins
//! 3. Sample due watches and collect edges that pass their filter
//!
//! Every user callback found along the way is returned as a [`Dispatch`]
//! and runs after the pass, never inside it.

use alloc::vec::Vec;
use core::fmt;

use super::edge::Edge;
use super::timer::{Completion, Deferred, Owner, Timer, TimerId};
use super::watch::{EdgeCallback, WatchEntry, WatchOrigin};
use crate::config::DEFAULT_POLL_INTERVAL_MS;
use crate::error::{ArgumentFault, Result};

/// Level access the scheduler needs, by header pin
pub trait PinLevels {
    /// Read the current level
    fn level(&mut self, pin: u8) -> bool;

    /// Drive an output
    fn drive(&mut self, pin: u8, high: bool);
}

/// Callback ready to run
pub enum Dispatch {
    /// Edge seen by a watch
    Edge {
        callback: EdgeCallback,
        level: bool,
        pin: u8,
    },
    /// Timer completion or deferred read
    Level { callback: Completion, level: bool },
}

impl Dispatch {
    /// Run the callback
    pub fn run(self) {
        match self {
            Dispatch::Edge {
                callback,
                level,
                pin,
            } => match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(level, pin),
                // Already running further up the stack
                Err(_) => log::debug!("pin {} edge dropped, callback busy", pin),
            },
            Dispatch::Level { callback, level } => callback(level),
        }
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Edge { level, pin, .. } => f
                .debug_struct("Edge")
                .field("level", level)
                .field("pin", pin)
                .finish_non_exhaustive(),
            Dispatch::Level { level, .. } => f
                .debug_struct("Level")
                .field("level", level)
                .finish_non_exhaustive(),
        }
    }
}

/// Watch and timer scheduler
#[derive(Debug)]
pub struct Scheduler {
    watches: Vec<WatchEntry>,
    timers: Vec<Timer>,
    deferred: Vec<Deferred>,
    next_timer_id: u32,
    default_interval_ms: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            watches: Vec::new(),
            timers: Vec::new(),
            deferred: Vec::new(),
            next_timer_id: 0,
            default_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval used when a watch does not name one
    pub fn default_interval_ms(&self) -> u32 {
        self.default_interval_ms
    }

    /// Change the default interval
    pub fn set_default_interval(&mut self, interval_ms: u32) -> Result<()> {
        self.default_interval_ms = self.resolve_interval(Some(interval_ms))?;
        Ok(())
    }

    /// Resolve an optional interval, rejecting zero
    pub fn resolve_interval(&self, interval_ms: Option<u32>) -> Result<u32> {
        match interval_ms {
            None => Ok(self.default_interval_ms),
            Some(0) => Err(ArgumentFault::PollInterval.into()),
            Some(ms) => Ok(ms),
        }
    }

    /// Arm a watch on `pin` for `owner`, replacing any watch already on it
    ///
    /// `initial` is the level the pin has right now; the first edge is
    /// measured against it.
    #[allow(clippy::too_many_arguments)]
    pub fn arm(
        &mut self,
        now: u64,
        pin: u8,
        owner: Owner,
        edge: Edge,
        interval_ms: Option<u32>,
        initial: bool,
        origin: WatchOrigin,
        callback: EdgeCallback,
    ) -> Result<()> {
        let interval_ms = self.resolve_interval(interval_ms)?;
        if self.unwatch(pin) {
            log::debug!("pin {} watch re-armed", pin);
        }
        self.watches.push(WatchEntry {
            pin,
            owner,
            edge,
            interval_ms,
            last_state: initial,
            next_due: now + u64::from(interval_ms),
            origin,
            callback,
        });
        Ok(())
    }

    /// Remove the watch on `pin`; false if there was none
    pub fn unwatch(&mut self, pin: u8) -> bool {
        let before = self.watches.len();
        self.watches.retain(|w| w.pin != pin);
        self.watches.len() != before
    }

    /// Remove every aggregate watch; returns how many were removed
    pub fn unwatch_aggregate(&mut self) -> usize {
        let before = self.watches.len();
        self.watches.retain(|w| w.origin != WatchOrigin::Aggregate);
        before - self.watches.len()
    }

    /// Watch armed on `pin`, if any
    pub fn watch(&self, pin: u8) -> Option<&WatchEntry> {
        self.watches.iter().find(|w| w.pin == pin)
    }

    /// Number of armed watches
    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    /// Schedule a level write on `pin` after `delay_ms`
    pub fn schedule(
        &mut self,
        now: u64,
        pin: u8,
        owner: Owner,
        delay_ms: u32,
        level: bool,
        completion: Option<Completion>,
    ) -> TimerId {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id = self.next_timer_id.wrapping_add(1);
        self.timers.push(Timer {
            id,
            pin,
            owner,
            due: now + u64::from(delay_ms),
            level,
            completion,
        });
        id
    }

    /// Cancel one timer; false if it already fired or never existed
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Timers still pending for `owner`
    pub fn pending_timers(&self, owner: Owner) -> usize {
        self.timers.iter().filter(|t| t.owner == owner).count()
    }

    /// Queue a level for delivery on the next pass
    pub fn defer(&mut self, level: bool, callback: Completion) {
        self.deferred.push(Deferred { level, callback });
    }

    /// Cancel the watch and every timer on `pin`, whoever owns them
    ///
    /// Deliveries already queued are left alone.
    pub fn cancel_pin(&mut self, pin: u8) {
        self.unwatch(pin);
        self.timers.retain(|t| t.pin != pin);
    }

    /// Cancel the watches and timers `owner` armed
    pub fn cancel_owner(&mut self, owner: Owner) {
        self.watches.retain(|w| w.owner != owner);
        self.timers.retain(|t| t.owner != owner);
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.watches.clear();
        self.timers.clear();
        self.deferred.clear();
    }

    /// Earliest time a pass has work to do
    pub fn next_deadline(&self, now: u64) -> Option<u64> {
        if !self.deferred.is_empty() {
            return Some(now);
        }
        let timers = self.timers.iter().map(|t| t.due);
        let watches = self.watches.iter().map(|w| w.next_due);
        timers.chain(watches).min()
    }

    /// Run one pass at `now`
    pub fn poll<L: PinLevels>(&mut self, now: u64, io: &mut L) -> Vec<Dispatch> {
        let mut out: Vec<Dispatch> = self
            .deferred
            .drain(..)
            .map(|d| Dispatch::Level {
                callback: d.callback,
                level: d.level,
            })
            .collect();

        let mut due: Vec<Timer> = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].due <= now {
                due.push(self.timers.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|t| (t.due, t.id));
        for timer in due {
            io.drive(timer.pin, timer.level);
            if let Some(callback) = timer.completion {
                out.push(Dispatch::Level {
                    callback,
                    level: timer.level,
                });
            }
        }

        for entry in self.watches.iter_mut().filter(|w| w.next_due <= now) {
            let level = io.level(entry.pin);
            if let Some(level) = entry.sample(level) {
                out.push(Dispatch::Edge {
                    callback: entry.callback.clone(),
                    level,
                    pin: entry.pin,
                });
            }
            entry.reschedule(now);
        }

        out
    }
}
