//! Real-time run loop
//!
//! The board's scheduler runs on a virtual millisecond clock. These loops
//! tie that clock to wall time: they advance it to the elapsed time, run
//! whatever came due, then sleep until the next deadline.

use std::thread;
use std::time::{Duration, Instant};

use gpiomux_drivers::Board;
use gpiomux_hal::Driver;

/// Longest sleep between checks of the stop condition
const MAX_NAP: Duration = Duration::from_millis(10);

/// Run watches and timed writes for `duration`
///
/// Returns the number of callbacks run.
pub fn run_for<D: Driver>(board: &Board<D>, duration: Duration) -> usize {
    let end = Instant::now() + duration;
    run_until(board, || Instant::now() >= end)
}

/// Run watches and timed writes until `stop` returns true
///
/// `stop` is checked after every pass and at least every 10 ms.
pub fn run_until<D: Driver>(board: &Board<D>, mut stop: impl FnMut() -> bool) -> usize {
    let origin = Instant::now();
    let base = board.now_ms();
    let mut ran = 0;
    loop {
        let now = base + origin.elapsed().as_millis() as u64;
        ran += board.advance_to(now);
        if stop() {
            break;
        }
        let nap = match board.next_deadline() {
            Some(due) => Duration::from_millis(due.saturating_sub(now)).min(MAX_NAP),
            None => MAX_NAP,
        };
        if !nap.is_zero() {
            thread::sleep(nap);
        }
    }
    log::debug!("run loop stopped after {} callbacks", ran);
    ran
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpiomux_hal_sim::SimBoard;

    #[test]
    fn test_run_for_fires_timed_write() {
        let board = Board::new(SimBoard::new());
        let out = board.output(33).unwrap();
        out.pulse(20, None).unwrap();
        assert_eq!(out.read(), Ok(true));
        run_for(&board, Duration::from_millis(60));
        assert_eq!(out.read(), Ok(false));
        assert!(board.now_ms() >= 20);
    }

    #[test]
    fn test_run_until_stops() {
        let board = Board::new(SimBoard::new());
        let mut polls = 0;
        run_until(&board, || {
            polls += 1;
            polls == 3
        });
        assert_eq!(polls, 3);
    }
}
