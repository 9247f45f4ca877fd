pub mod coordinates;
pub mod workout;

pub use coordinates::Coordinates;
pub use workout::{Workout, WorkoutId, WorkoutKind, WorkoutMetrics};
