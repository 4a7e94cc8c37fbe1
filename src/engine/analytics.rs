use crate::engine::records::LapRecord;
use serde::{Deserialize, Serialize};

/// Aggregate lap statistics, recomputed after every lap mutation.
/// Splits never contribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub lap_count: usize,
    pub average_lap_ms: Option<f64>,
    pub best_lap: Option<LapRecord>,
    pub worst_lap: Option<LapRecord>,
    pub consistency_percent: f64,
}

pub fn compute(laps: &[LapRecord]) -> AnalyticsSnapshot {
    if laps.is_empty() {
        return AnalyticsSnapshot {
            consistency_percent: 100.0,
            ..AnalyticsSnapshot::default()
        };
    }

    let total: u64 = laps.iter().map(|lap| lap.lap_ms).sum();
    let average = total as f64 / laps.len() as f64;

    // Ties go to the earliest lap; min/max scan in capture order already
    // keeps the first occurrence when using strict comparisons.
    let mut best = &laps[0];
    let mut worst = &laps[0];
    for lap in &laps[1..] {
        if lap.lap_ms < best.lap_ms {
            best = lap;
        }
        if lap.lap_ms > worst.lap_ms {
            worst = lap;
        }
    }

    let consistency = if laps.len() < 2 {
        100.0
    } else if average == 0.0 {
        // All-zero laps would divide by zero; report no consistency.
        0.0
    } else {
        let variance = laps
            .iter()
            .map(|lap| {
                let diff = lap.lap_ms as f64 - average;
                diff * diff
            })
            .sum::<f64>()
            / laps.len() as f64;
        (100.0 - (variance.sqrt() / average * 100.0)).max(0.0)
    };

    AnalyticsSnapshot {
        lap_count: laps.len(),
        average_lap_ms: Some(average),
        best_lap: Some(best.clone()),
        // A single lap cannot be the worst.
        worst_lap: (laps.len() > 1).then(|| worst.clone()),
        consistency_percent: consistency,
    }
}
