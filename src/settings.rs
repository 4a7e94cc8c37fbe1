use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Centiseconds,
    Milliseconds,
}

impl Precision {
    /// Recommended driver-loop granularity; anything finer only burns
    /// callbacks without improving accuracy.
    pub fn tick_interval(&self) -> Duration {
        match self {
            Precision::Centiseconds => Duration::from_millis(10),
            Precision::Milliseconds => Duration::from_millis(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub precision: Precision,
    pub sound_enabled: bool,
    /// Whole seconds between automatic laps; 0 disables the feature.
    pub auto_lap_interval: u32,
    pub confirm_reset: bool,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: Precision::Centiseconds,
            sound_enabled: true,
            auto_lap_interval: 0,
            confirm_reset: true,
            theme: Theme::Light,
        }
    }
}

impl Settings {
    /// Merges a persisted blob over the defaults field by field, so a
    /// partial or partially-corrupt blob degrades to defaults for the
    /// affected fields only. Unknown keys are ignored.
    pub fn merged(value: Value) -> Self {
        let mut settings = Settings::default();
        let Value::Object(map) = value else {
            return settings;
        };

        fn field<T: serde::de::DeserializeOwned>(
            map: &serde_json::Map<String, Value>,
            key: &str,
            slot: &mut T,
        ) {
            if let Some(value) = map.get(key) {
                match serde_json::from_value(value.clone()) {
                    Ok(parsed) => *slot = parsed,
                    Err(e) => tracing::warn!(%e, key, "Ignoring invalid setting"),
                }
            }
        }

        field(&map, "precision", &mut settings.precision);
        field(&map, "soundEnabled", &mut settings.sound_enabled);
        field(&map, "autoLapInterval", &mut settings.auto_lap_interval);
        field(&map, "confirmReset", &mut settings.confirm_reset);
        field(&map, "theme", &mut settings.theme);
        settings
    }
}

/// Persists the settings blob at a fixed path. Loading never fails; saving
/// is fire-and-forget for the caller, which only logs a failed write.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Settings {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|blob| serde_json::from_str(&blob).ok())
            .map(Settings::merged)
            .unwrap_or_default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        let blob = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, blob)
    }
}
