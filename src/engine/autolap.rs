/// Tracks the last elapsed value at which an automatic lap fired and decides
/// when the next interval boundary has been crossed. At most one lap fires
/// per tick: a slow tick that skips several boundaries catches up to the
/// latest one in a single lap.
#[derive(Default)]
pub struct AutoLap {
    last_boundary_ms: u64,
}

impl AutoLap {
    pub fn should_fire(&self, elapsed_ms: u64, interval_sec: u32) -> bool {
        if interval_sec == 0 {
            return false;
        }
        let interval_ms = u64::from(interval_sec) * 1000;
        elapsed_ms / interval_ms > self.last_boundary_ms / interval_ms
    }

    pub fn mark(&mut self, elapsed_ms: u64) {
        self.last_boundary_ms = elapsed_ms;
    }

    pub fn reset(&mut self) {
        self.last_boundary_ms = 0;
    }
}
