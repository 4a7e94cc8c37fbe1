use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapRecord {
    /// 1-based, in capture order; never reused within a session.
    pub sequence: u32,
    /// Time since the previous lap, or since start for the first lap.
    pub lap_ms: u64,
    /// Total elapsed time at the instant of capture.
    pub total_ms: u64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRecord {
    /// 1-based, numbered independently of laps.
    pub sequence: u32,
    /// Cumulative marker only; no delta is derived.
    pub elapsed_ms: u64,
    pub captured_at: DateTime<Utc>,
}

/// Ordered lap and split sequences for the current session.
#[derive(Default)]
pub struct RecordStore {
    laps: Vec<LapRecord>,
    splits: Vec<SplitRecord>,
}

impl RecordStore {
    pub fn push_lap(&mut self, total_ms: u64, captured_at: DateTime<Utc>) -> &LapRecord {
        let previous_total = self.laps.last().map(|lap| lap.total_ms).unwrap_or(0);
        let lap = LapRecord {
            sequence: self.laps.len() as u32 + 1,
            lap_ms: total_ms.saturating_sub(previous_total),
            total_ms,
            captured_at,
        };
        self.laps.push(lap);
        self.laps.last().unwrap()
    }

    pub fn push_split(&mut self, elapsed_ms: u64, captured_at: DateTime<Utc>) -> &SplitRecord {
        let split = SplitRecord {
            sequence: self.splits.len() as u32 + 1,
            elapsed_ms,
            captured_at,
        };
        self.splits.push(split);
        self.splits.last().unwrap()
    }

    pub fn clear(&mut self) {
        self.laps.clear();
        self.splits.clear();
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn splits(&self) -> &[SplitRecord] {
        &self.splits
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty() && self.splits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.laps.len() + self.splits.len()
    }
}
