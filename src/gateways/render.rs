use std::time::Duration;

use serde::Serialize;

use crate::models::{Workout, WorkoutId, WorkoutKind, WorkoutMetrics};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPopup {
    pub content: String,
    pub class_name: Option<String>,
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
}

impl MarkerPopup {
    /// Popup for the "you are here" marker dropped when the map loads.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            class_name: None,
            max_width: 300,
            min_width: 50,
            auto_close: true,
            close_on_click: true,
        }
    }

    /// Sticky, kind-styled popup for a workout marker.
    pub fn for_workout(workout: &Workout) -> Self {
        let kind = workout.kind();
        Self {
            content: format!("{} {}", kind.icon(), workout.label()),
            class_name: Some(format!("{}-popup", kind.as_str())),
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PanOptions {
    pub zoom: u8,
    pub animate: bool,
    pub duration: Duration,
}

/// Everything a list renderer needs for one workout row.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    pub id: WorkoutId,
    pub kind: WorkoutKind,
    pub title: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub metric_value: f64,
    pub metric_unit: &'static str,
    pub extra_value: f64,
    pub extra_unit: &'static str,
}

impl ListEntry {
    pub fn from_workout(workout: &Workout) -> Self {
        let (metric_value, metric_unit, extra_value, extra_unit) = match *workout.metrics() {
            WorkoutMetrics::Running {
                cadence_spm,
                pace_min_per_km,
            } => (pace_min_per_km, "min/km", cadence_spm, "spm"),
            WorkoutMetrics::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => (speed_km_per_h, "km/h", elevation_gain_m, "m"),
        };

        Self {
            id: workout.id().clone(),
            kind: workout.kind(),
            title: workout.label().to_string(),
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            metric_value,
            metric_unit,
            extra_value,
            extra_unit,
        }
    }

    fn extra_icon(&self) -> &'static str {
        match self.kind {
            WorkoutKind::Running => "🦶🏼",
            WorkoutKind::Cycling => "⛰",
        }
    }

    /// `<li>` markup for a browser list. The `data-id` attribute is what the
    /// host hands back on click.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str(&format!(
            "<li class=\"workout workout--{}\" data-id=\"{}\">\n",
            self.kind, self.id
        ));
        html.push_str(&format!("  <h2 class=\"workout__title\">{}</h2>\n", self.title));
        html.push_str(&detail(self.kind.icon(), &self.distance_km.to_string(), "km"));
        html.push_str(&detail("⏱", &self.duration_min.to_string(), "min"));
        html.push_str(&detail(
            "⚡️",
            &format!("{:.1}", self.metric_value),
            self.metric_unit,
        ));
        html.push_str(&detail(
            self.extra_icon(),
            &self.extra_value.to_string(),
            self.extra_unit,
        ));
        html.push_str("</li>\n");
        html
    }
}

fn detail(icon: &str, value: &str, unit: &str) -> String {
    format!(
        "  <div class=\"workout__details\">\n    <span class=\"workout__icon\">{icon}</span>\n    <span class=\"workout__value\">{value}</span>\n    <span class=\"workout__unit\">{unit}</span>\n  </div>\n"
    )
}
