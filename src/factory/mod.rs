//! Turns raw form input into validated `Workout` records.
//!
//! Validation is fail-fast, in this order:
//! 1. coordinates and every numeric field must be finite numbers (`NotANumber`)
//! 2. distance and duration must be > 0, and so must cadence for a run
//!    (`NonPositiveValue`)
//!
//! Elevation gain is *not* part of the positivity check: a ride with zero
//! (or negative) elevation gain is accepted. Runs and rides are deliberately
//! asymmetric here.

pub mod ids;
pub mod validation;

pub use ids::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidIds};
pub use validation::{FormField, ValidationError};

use serde::{Deserialize, Serialize};

use crate::models::{Coordinates, Workout, WorkoutKind};
use validation::{parse_number, require_positive};

/// Raw values as they sit in the form, before any conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub kind: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl FormInput {
    /// The kind-specific raw value: cadence for runs, elevation for rides.
    pub fn extra_for(&self, kind: WorkoutKind) -> &str {
        match kind {
            WorkoutKind::Running => &self.cadence,
            WorkoutKind::Cycling => &self.elevation,
        }
    }
}

pub struct WorkoutFactory {
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl WorkoutFactory {
    pub fn new(ids: Box<dyn IdGenerator>, clock: Box<dyn Clock>) -> Self {
        Self { ids, clock }
    }

    /// Factory backed by random ids and the system clock.
    pub fn system() -> Self {
        Self::new(Box::new(UuidIds), Box::new(SystemClock))
    }

    pub fn create(
        &mut self,
        kind: WorkoutKind,
        coordinates: Coordinates,
        distance: &str,
        duration: &str,
        extra: &str,
    ) -> Result<Workout, ValidationError> {
        if !coordinates.is_finite() {
            return Err(ValidationError::NotANumber {
                field: FormField::Coordinates,
            });
        }

        let distance_km = parse_number(FormField::Distance, distance)?;
        let duration_min = parse_number(FormField::Duration, duration)?;

        match kind {
            WorkoutKind::Running => {
                let cadence = parse_number(FormField::Cadence, extra)?;
                require_positive(&[
                    (FormField::Distance, distance_km),
                    (FormField::Duration, duration_min),
                    (FormField::Cadence, cadence),
                ])?;
                Ok(Workout::running(
                    self.ids.next_id(),
                    self.clock.now(),
                    coordinates,
                    distance_km,
                    duration_min,
                    cadence,
                ))
            }
            WorkoutKind::Cycling => {
                let elevation = parse_number(FormField::Elevation, extra)?;
                require_positive(&[
                    (FormField::Distance, distance_km),
                    (FormField::Duration, duration_min),
                ])?;
                Ok(Workout::cycling(
                    self.ids.next_id(),
                    self.clock.now(),
                    coordinates,
                    distance_km,
                    duration_min,
                    elevation,
                ))
            }
        }
    }

    /// Resolves the kind from the form, then defers to [`Self::create`].
    pub fn create_from_input(
        &mut self,
        coordinates: Coordinates,
        input: &FormInput,
    ) -> Result<Workout, ValidationError> {
        let kind = input
            .kind
            .parse::<WorkoutKind>()
            .map_err(ValidationError::UnknownKind)?;
        self.create(
            kind,
            coordinates,
            &input.distance,
            &input.duration,
            input.extra_for(kind),
        )
    }
}
