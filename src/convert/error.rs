use std::path::PathBuf;

use thiserror::Error;

use crate::hardware::error::CalibrationError;
use crate::instruction::error::InstructionError;
use crate::kinematics::error::KinematicsError;

///
/// All errors emitted while converting a path into steps. Every error is fatal for the run.
/// Output written before the failure is left in place.
///
/// - `Calibration`: The settings could not be turned into a machine geometry
/// - `Input`: The path could not be read or tokenized
/// - `Kinematics`: The engine rejected a path element
///     Parameters:
///     - `index`: The zero-based index of the element in the path
///     - `line`: The one-based line the element was read from
///     - `source`: The engine error
/// - `Output`: The steps could not be written
///     Parameters:
///     - `index`: The zero-based index of the element being written
///     - `source`: The write error
/// - `File`: A file could not be opened or created
///     Parameters:
///     - `path`: The file path
///     - `source`: The IO error
///
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Input(#[from] InstructionError),

    #[error("Element {} (line {}): {}", .index, .line, .source)]
    Kinematics { index: usize, line: usize, source: KinematicsError },

    #[error("Failed writing element {}: {}", .index, .source)]
    Output { index: usize, source: InstructionError },

    #[error("Could not open {}: {}", .path.display(), .source)]
    File { path: PathBuf, source: std::io::Error },
}

impl ConvertError {
    ///
    /// # Returns:
    /// - The one-based input line the error occurred at, if it relates to a specific line
    ///
    pub fn line(&self) -> Option<usize> {
        match self {
            ConvertError::Input(err) => err.line(),
            ConvertError::Kinematics { line, .. } => Some(*line),
            _ => None,
        }
    }
}
