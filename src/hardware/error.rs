use thiserror::Error;

///
/// All errors emitted while loading and deriving the machine calibration.
/// The error messages can be displayed to users on the frontend. Format nicely please.
///
/// - `Configuration`: A calibration field is missing, zero, or otherwise unusable
///     Parameters:
///     - `field`: The settings key at fault
///     - `reason`: What was wrong with it
/// - `Geometry`: The start position cannot be reached given the motor separation, i.e. the
/// start belt is shorter than half of the distance between the motors
///     Parameters:
///     - `start_distance`: The left start belt length, in steps
///     - `half_separation`: Half of the motor separation, in steps
///
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Invalid machine setting '{}': {}", .field, .reason)]
    Configuration { field: String, reason: String },

    #[error("The start position is unreachable: start belt of {} steps is shorter than half the motor separation ({} steps).", .start_distance, .half_separation)]
    Geometry { start_distance: i64, half_separation: f64 },
}

impl CalibrationError {
    pub(crate) fn config(field: &str, reason: impl Into<String>) -> Self {
        CalibrationError::Configuration { field: field.to_owned(), reason: reason.into() }
    }
}
