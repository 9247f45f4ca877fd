use std::fmt;

use thiserror::Error;

/// Form inputs that take part in validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Coordinates,
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Coordinates => "coordinates",
            FormField::Distance => "distance",
            FormField::Duration => "duration",
            FormField::Cadence => "cadence",
            FormField::Elevation => "elevation",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Inputs have to be positive numbers ({field} is not a number)")]
    NotANumber { field: FormField },

    #[error("Inputs have to be positive numbers ({field} must be greater than zero)")]
    NonPositiveValue { field: FormField },

    #[error("Unknown workout type '{0}'")]
    UnknownKind(String),
}

/// Converts a raw form value the way a browser's numeric coercion does:
/// surrounding whitespace is ignored and a blank field reads as 0.
pub fn parse_number(field: FormField, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(ValidationError::NotANumber { field })
}

/// Fails on the first field that is not strictly positive.
pub fn require_positive(values: &[(FormField, f64)]) -> Result<(), ValidationError> {
    match values.iter().find(|(_, value)| *value <= 0.0) {
        Some((field, _)) => Err(ValidationError::NonPositiveValue { field: *field }),
        None => Ok(()),
    }
}
