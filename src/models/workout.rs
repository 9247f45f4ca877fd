use std::{borrow::Borrow, fmt, str::FromStr};

use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Coordinates;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    #[default]
    Running,
    Cycling,
}

impl WorkoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃",
            WorkoutKind::Cycling => "🚴",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(WorkoutKind::Running),
            "cycling" => Ok(WorkoutKind::Cycling),
            other => Err(other.to_string()),
        }
    }
}

/// Opaque record identifier. List entries carry it back to the controller on
/// click, so it is the only key the selection flow ever sees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WorkoutId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind-specific inputs and the metric derived from them.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(
    tag = "kind",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum WorkoutMetrics {
    Running {
        cadence_spm: f64,
        /// `duration_min / distance_km`
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        /// `distance_km / duration_min`; no unit conversion is applied.
        speed_km_per_h: f64,
    },
}

impl WorkoutMetrics {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            WorkoutMetrics::Running { .. } => WorkoutKind::Running,
            WorkoutMetrics::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// One logged activity.
///
/// Everything except `click_count` is fixed at construction; derived values
/// (pace or speed, label) are computed once in the constructors below and
/// there is no API to recompute them.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<FixedOffset>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    click_count: u32,
    label: String,
    #[serde(flatten)]
    metrics: WorkoutMetrics,
}

impl Workout {
    /// Callers must have validated the inputs; see `WorkoutFactory`.
    pub(crate) fn running(
        id: WorkoutId,
        created_at: DateTime<FixedOffset>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Self {
        let metrics = WorkoutMetrics::Running {
            cadence_spm,
            pace_min_per_km: duration_min / distance_km,
        };
        Self::assemble(id, created_at, coordinates, distance_km, duration_min, metrics)
    }

    /// Callers must have validated the inputs; see `WorkoutFactory`.
    pub(crate) fn cycling(
        id: WorkoutId,
        created_at: DateTime<FixedOffset>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Self {
        let metrics = WorkoutMetrics::Cycling {
            elevation_gain_m,
            speed_km_per_h: distance_km / duration_min,
        };
        Self::assemble(id, created_at, coordinates, distance_km, duration_min, metrics)
    }

    fn assemble(
        id: WorkoutId,
        created_at: DateTime<FixedOffset>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        metrics: WorkoutMetrics,
    ) -> Self {
        let label = describe(metrics.kind(), &created_at);
        Self {
            id,
            created_at,
            coordinates,
            distance_km,
            duration_min,
            click_count: 0,
            label,
            metrics,
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> WorkoutKind {
        self.metrics.kind()
    }

    pub fn metrics(&self) -> &WorkoutMetrics {
        &self.metrics
    }

    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.metrics {
            WorkoutMetrics::Running { pace_min_per_km, .. } => Some(pace_min_per_km),
            WorkoutMetrics::Cycling { .. } => None,
        }
    }

    pub fn speed_km_per_h(&self) -> Option<f64> {
        match self.metrics {
            WorkoutMetrics::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            WorkoutMetrics::Running { .. } => None,
        }
    }

    /// The only post-construction mutation.
    pub(crate) fn register_click(&mut self) {
        self.click_count = self.click_count.saturating_add(1);
    }
}

/// Month and day are read in the offset the clock stamped, i.e. the user's
/// calendar day rather than UTC's.
fn describe(kind: WorkoutKind, created_at: &DateTime<FixedOffset>) -> String {
    format!(
        "{} on {} {}",
        kind.title(),
        created_at.format("%B"),
        created_at.day()
    )
}
