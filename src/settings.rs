use std::{env, fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::models::Coordinates;

pub const SETTINGS_PATH_VAR: &str = "TRAILMARK_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "trailmark.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerSettings {
    pub map_zoom: u8,
    pub pan_duration_ms: u64,
    pub form_restore_delay_ms: u64,
    pub initial_popup: String,
    /// `"lat,lng"`; only the console host's geolocation provider reads it.
    pub start_position: Option<String>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            map_zoom: 13,
            pan_duration_ms: 1000,
            form_restore_delay_ms: 1000,
            initial_popup: "You are here".into(),
            start_position: None,
        }
    }
}

impl TrackerSettings {
    pub fn pan_duration(&self) -> Duration {
        Duration::from_millis(self.pan_duration_ms)
    }

    pub fn form_restore_delay(&self) -> Duration {
        Duration::from_millis(self.form_restore_delay_ms)
    }

    pub fn start_coordinates(&self) -> Option<Coordinates> {
        self.start_position.as_deref().and_then(Coordinates::parse_pair)
    }

    /// Applies `TRAILMARK_*` variables on top of the current values. A value
    /// that does not parse is logged and skipped.
    pub fn apply_env_overrides(&mut self) {
        if let Some(zoom) = env_parsed::<u8>("TRAILMARK_MAP_ZOOM") {
            self.map_zoom = zoom;
        }
        if let Some(ms) = env_parsed::<u64>("TRAILMARK_PAN_DURATION_MS") {
            self.pan_duration_ms = ms;
        }
        if let Some(ms) = env_parsed::<u64>("TRAILMARK_FORM_RESTORE_DELAY_MS") {
            self.form_restore_delay_ms = ms;
        }
        if let Ok(position) = env::var("TRAILMARK_START_POSITION") {
            if Coordinates::parse_pair(&position).is_some() {
                self.start_position = Some(position);
            } else {
                warn!("Ignoring TRAILMARK_START_POSITION={position:?}: expected \"lat,lng\"");
            }
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {name}={raw:?}: not a valid value");
            None
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: TrackerSettings,
}

impl SettingsStore {
    /// Reads the file if it exists (defaults otherwise), then applies
    /// environment overrides.
    pub fn load(path: PathBuf) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings in {}", path.display()))?
        } else {
            TrackerSettings::default()
        };
        data.apply_env_overrides();

        Ok(Self { path, data })
    }

    /// Path from `TRAILMARK_SETTINGS`, falling back to `./trailmark.json`.
    pub fn default_path() -> PathBuf {
        env::var_os(SETTINGS_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn tracker(&self) -> &TrackerSettings {
        &self.data
    }

    pub fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
