use crate::engine::analytics::AnalyticsSnapshot;
use crate::engine::autolap::AutoLap;
use crate::engine::records::{LapRecord, RecordStore, SplitRecord};
use crate::engine::timing::{Phase, TimingState};
use crate::session::{SessionData, SessionExport};
use crate::settings::Settings;
use chrono::{DateTime, Utc};

pub mod analytics;
pub mod autolap;
pub mod records;
pub mod timing;

/// Outcome of a single driver tick.
pub struct Tick {
    pub elapsed_ms: u64,
    /// The lap the auto-lap trigger recorded during this tick, if any.
    pub auto_lap: Option<LapRecord>,
}

/// The stopwatch core: run-state machine, record store, analytics, and the
/// auto-lap trigger behind one facade. The host owns the instance and feeds
/// it timestamps; nothing here schedules or blocks.
pub struct Stopwatch {
    timing: TimingState,
    records: RecordStore,
    analytics: AnalyticsSnapshot,
    auto_lap: AutoLap,
    settings: Settings,
    session_start: DateTime<Utc>,
}

impl Stopwatch {
    pub fn new(settings: Settings, session_start: DateTime<Utc>) -> Self {
        Self {
            timing: TimingState::default(),
            records: RecordStore::default(),
            analytics: analytics::compute(&[]),
            auto_lap: AutoLap::default(),
            settings,
            session_start,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.timing.start(now_ms);
    }

    pub fn pause(&mut self, now_ms: u64) {
        self.timing.pause(now_ms);
    }

    pub fn toggle(&mut self, now_ms: u64) {
        if self.timing.is_running() {
            self.timing.pause(now_ms);
        } else {
            self.timing.start(now_ms);
        }
    }

    /// Advances elapsed time and evaluates the auto-lap trigger. Crossing
    /// several interval boundaries in one slow tick still records a single
    /// lap.
    pub fn tick(&mut self, now_ms: u64, wall: DateTime<Utc>) -> Tick {
        let elapsed_ms = self.timing.tick(now_ms);

        let mut auto_lap = None;
        if self.timing.is_running()
            && self
                .auto_lap
                .should_fire(elapsed_ms, self.settings.auto_lap_interval)
        {
            let lap = self.records.push_lap(elapsed_ms, wall).clone();
            self.analytics = analytics::compute(self.records.laps());
            self.auto_lap.mark(elapsed_ms);
            tracing::debug!(sequence = lap.sequence, lap_ms = lap.lap_ms, "Auto lap");
            auto_lap = Some(lap);
        }

        Tick {
            elapsed_ms,
            auto_lap,
        }
    }

    /// Records a lap at the current elapsed time. Refused (returns `None`)
    /// unless the stopwatch is running.
    pub fn record_lap(&mut self, now_ms: u64, wall: DateTime<Utc>) -> Option<LapRecord> {
        if !self.timing.is_running() {
            return None;
        }
        let total_ms = self.timing.tick(now_ms);
        let lap = self.records.push_lap(total_ms, wall).clone();
        self.analytics = analytics::compute(self.records.laps());
        Some(lap)
    }

    /// Records a cumulative split marker. Refused unless running.
    pub fn record_split(&mut self, now_ms: u64, wall: DateTime<Utc>) -> Option<SplitRecord> {
        if !self.timing.is_running() {
            return None;
        }
        let elapsed_ms = self.timing.tick(now_ms);
        Some(self.records.push_split(elapsed_ms, wall).clone())
    }

    /// Returns to `Ready` and discards all records. Any confirmation
    /// prompting happens in the presentation layer before this is called.
    pub fn reset(&mut self) {
        self.timing.reset();
        self.records.clear();
        self.auto_lap.reset();
        self.analytics = analytics::compute(&[]);
    }

    /// Discards records without touching the run state.
    pub fn clear_records(&mut self) {
        self.records.clear();
        self.analytics = analytics::compute(&[]);
    }

    /// Whether a reset would lose anything worth confirming.
    pub fn has_session_data(&self) -> bool {
        self.timing.elapsed_ms() > 0 || !self.records.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.timing.phase()
    }

    pub fn is_running(&self) -> bool {
        self.timing.is_running()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.timing.elapsed_ms()
    }

    pub fn laps(&self) -> &[LapRecord] {
        self.records.laps()
    }

    pub fn splits(&self) -> &[SplitRecord] {
        self.records.splits()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn analytics(&self) -> &AnalyticsSnapshot {
        &self.analytics
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    pub fn export(&self, exported_at: DateTime<Utc>) -> SessionExport {
        SessionExport {
            session: SessionData {
                start_time: self.session_start,
                total_time: self.timing.elapsed_ms(),
                lap_times: self.records.laps().to_vec(),
                split_times: self.records.splits().to_vec(),
                performance_metrics: self.analytics.clone(),
            },
            settings: self.settings.clone(),
            export_time: exported_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(ms: u64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms as i64).unwrap()
    }

    fn running_stopwatch(settings: Settings) -> Stopwatch {
        let mut stopwatch = Stopwatch::new(settings, wall(0));
        stopwatch.start(0);
        stopwatch
    }

    #[test]
    fn laps_number_from_one_and_sum_to_the_total() {
        let mut stopwatch = running_stopwatch(Settings::default());
        for now in [1_000, 2_500, 4_000] {
            stopwatch.record_lap(now, wall(now));
        }

        let laps = stopwatch.laps();
        assert_eq!(
            laps.iter().map(|l| l.sequence).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        let sum: u64 = laps.iter().map(|l| l.lap_ms).sum();
        assert_eq!(sum, laps[2].total_ms);
        assert_eq!(stopwatch.analytics().lap_count, 3);
    }

    #[test]
    fn records_are_refused_while_not_running() {
        let mut stopwatch = Stopwatch::new(Settings::default(), wall(0));
        assert!(stopwatch.record_lap(1_000, wall(1_000)).is_none());
        assert!(stopwatch.record_split(1_000, wall(1_000)).is_none());

        stopwatch.start(0);
        stopwatch.pause(2_000);
        assert!(stopwatch.record_lap(3_000, wall(3_000)).is_none());
    }

    #[test]
    fn toggle_alternates_running_and_paused() {
        let mut stopwatch = Stopwatch::new(Settings::default(), wall(0));
        stopwatch.toggle(0);
        assert_eq!(stopwatch.phase(), Phase::Running);
        stopwatch.toggle(1_000);
        assert_eq!(stopwatch.phase(), Phase::Paused);
        assert_eq!(stopwatch.elapsed_ms(), 1_000);
        stopwatch.toggle(5_000);
        assert_eq!(stopwatch.phase(), Phase::Running);
    }

    #[test]
    fn reset_clears_records_and_rearms_auto_lap() {
        let mut settings = Settings::default();
        settings.auto_lap_interval = 10;
        let mut stopwatch = running_stopwatch(settings);

        stopwatch.tick(10_500, wall(10_500));
        assert_eq!(stopwatch.laps().len(), 1);

        stopwatch.reset();
        assert_eq!(stopwatch.phase(), Phase::Ready);
        assert_eq!(stopwatch.elapsed_ms(), 0);
        assert!(stopwatch.laps().is_empty());
        assert!(!stopwatch.has_session_data());

        // A fresh run fires the first boundary again.
        stopwatch.start(0);
        let tick = stopwatch.tick(10_200, wall(10_200));
        assert!(tick.auto_lap.is_some());
    }

    #[test]
    fn slow_tick_records_one_auto_lap_not_two() {
        let mut settings = Settings::default();
        settings.auto_lap_interval = 10;
        let mut stopwatch = running_stopwatch(settings);

        let tick = stopwatch.tick(9_990, wall(9_990));
        assert!(tick.auto_lap.is_none());

        // The driver stalls and the next tick lands past two boundaries.
        let tick = stopwatch.tick(19_990, wall(19_990));
        let lap = tick.auto_lap.expect("boundary crossing records a lap");
        assert_eq!(lap.sequence, 1);
        assert_eq!(stopwatch.laps().len(), 1);

        let tick = stopwatch.tick(20_010, wall(20_010));
        assert!(tick.auto_lap.is_some());
        assert_eq!(stopwatch.laps().len(), 2);
    }

    #[test]
    fn auto_lap_is_inert_while_paused() {
        let mut settings = Settings::default();
        settings.auto_lap_interval = 1;
        let mut stopwatch = running_stopwatch(settings);
        stopwatch.pause(500);

        let tick = stopwatch.tick(60_000, wall(60_000));
        assert_eq!(tick.elapsed_ms, 500);
        assert!(tick.auto_lap.is_none());
        assert!(stopwatch.laps().is_empty());
    }

    #[test]
    fn clear_records_keeps_the_clock_running() {
        let mut stopwatch = running_stopwatch(Settings::default());
        stopwatch.record_lap(1_000, wall(1_000));
        stopwatch.record_split(1_500, wall(1_500));

        stopwatch.clear_records();
        assert_eq!(stopwatch.record_count(), 0);
        assert_eq!(stopwatch.phase(), Phase::Running);

        let lap = stopwatch.record_lap(2_000, wall(2_000)).unwrap();
        assert_eq!(lap.sequence, 1);
    }
}
