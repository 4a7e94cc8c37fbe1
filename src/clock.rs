use chrono::{DateTime, Utc};
use std::time::Instant;

/// Time source for the driver loop: a monotonic millisecond counter for
/// elapsed-time arithmetic and a wall clock for record timestamps.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
