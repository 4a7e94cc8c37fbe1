#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Ready,
    Running,
    Paused,
}

/// Run state and elapsed-time accumulation. Elapsed time is derived from a
/// reference instant while running, so a missed tick loses nothing.
pub struct TimingState {
    phase: Phase,
    elapsed_ms: u64,
    reference_start_ms: u64,
}

impl Default for TimingState {
    fn default() -> Self {
        Self {
            phase: Phase::Ready,
            elapsed_ms: 0,
            reference_start_ms: 0,
        }
    }
}

impl TimingState {
    pub fn start(&mut self, now_ms: u64) {
        if self.phase == Phase::Running {
            return;
        }
        self.reference_start_ms = now_ms.saturating_sub(self.elapsed_ms);
        self.phase = Phase::Running;
    }

    pub fn pause(&mut self, now_ms: u64) {
        if self.phase != Phase::Running {
            return;
        }
        self.elapsed_ms = now_ms.saturating_sub(self.reference_start_ms);
        self.phase = Phase::Paused;
    }

    /// Recomputes elapsed time while running; frozen otherwise.
    pub fn tick(&mut self, now_ms: u64) -> u64 {
        if self.phase == Phase::Running {
            self.elapsed_ms = now_ms.saturating_sub(self.reference_start_ms);
        }
        self.elapsed_ms
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Ready;
        self.elapsed_ms = 0;
        self.reference_start_ms = 0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}
