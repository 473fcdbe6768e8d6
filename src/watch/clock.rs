//! Injectable clock so the loop's timing is testable without real delays.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Time source and sleep dependency of the watch loop.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Block for the polling interval. Implementations used in tests may
    /// return immediately (and flip the loop's stop flag).
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
