use thiserror::Error;

///
/// All errors emitted from the kinematics engine.
///
/// - `NonFinite`: A point with a NaN or infinite coordinate reached the engine. The belt state
/// is left exactly as it was before the call.
///     Parameters:
///     - `x`: The x coordinate received
///     - `y`: The y coordinate received
/// - `Unrepresentable`: The belt lengths for a point, or the step delta to reach it, do not fit
/// in a whole number of steps. The belt state is left untouched.
///     Parameters:
///     - `x`: The x coordinate received
///     - `y`: The y coordinate received
///
#[derive(Error, Debug, PartialEq)]
pub enum KinematicsError {
    #[error("Cannot move to a non-finite position (x:{}, y:{}).", .x, .y)]
    NonFinite { x: f64, y: f64 },

    #[error("The position (x:{}, y:{}) is too far away to count in steps.", .x, .y)]
    Unrepresentable { x: f64, y: f64 },
}
