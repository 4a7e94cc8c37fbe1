use crate::engine::analytics::AnalyticsSnapshot;
use crate::engine::records::{LapRecord, SplitRecord};
use crate::settings::Settings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The session snapshot inside an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub start_time: DateTime<Utc>,
    pub total_time: u64,
    pub lap_times: Vec<LapRecord>,
    pub split_times: Vec<SplitRecord>,
    pub performance_metrics: AnalyticsSnapshot,
}

/// The full export blob handed to a file writer: session state, the active
/// settings, and when the export was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub session: SessionData,
    pub settings: Settings,
    pub export_time: DateTime<Utc>,
}

impl SessionExport {
    /// Default export file name, dated by the export's UTC day.
    pub fn default_file_name(&self) -> String {
        format!(
            "protimer-session-{}.json",
            self.export_time.format("%Y-%m-%d")
        )
    }

    pub fn write_to(&self, directory: &Path) -> anyhow::Result<PathBuf> {
        let path = directory.join(self.default_file_name());
        let blob = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, blob)?;
        Ok(path)
    }
}
