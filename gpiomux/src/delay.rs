//! Blocking waits

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Block the calling thread for `ms` milliseconds
pub fn wait_ms(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

/// Block the calling thread for `us` microseconds
pub fn wait_us(us: u64) {
    thread::sleep(Duration::from_micros(us));
}

/// `DelayNs` backed by `thread::sleep`
///
/// Waits are at least as long as asked; the OS may add latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        wait_us(u64::from(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        wait_ms(u64::from(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_waits_are_not_short() {
        let start = Instant::now();
        wait_ms(5);
        wait_us(500);
        StdDelay.delay_ms(5);
        assert!(start.elapsed() >= Duration::from_micros(10_500));
    }
}
