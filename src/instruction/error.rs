use thiserror::Error;

/// All errors emitted from the instruction module.
///
/// - `Malformed`: When a line is neither a control keyword nor a coordinate pair
///     Parameters:
///     - `line`: The one-based line number
///     - `content`: The offending line, with line endings stripped
/// - `FieldCount`: When a coordinate line does not have exactly two fields
///     Parameters:
///     - `line`: The one-based line number
///     - `found`: The number of whitespace separated fields on the line
/// - `InvalidNumber`: When a coordinate field cannot be read as a number
///     Parameters:
///     - `line`: The one-based line number
///     - `field`: The field which failed to parse
/// - `Io`: When the path could not be read, or the output could not be written
#[derive(Error, Debug)]
pub enum InstructionError {
    #[error("Line {}: '{}' is not PAUSE, PENUP, PENDOWN or an x y coordinate pair.", .line, .content)]
    Malformed { line: usize, content: String },

    #[error("Line {}: expected 2 coordinates, found {}.", .line, .found)]
    FieldCount { line: usize, found: usize },

    #[error("Line {}: '{}' is not a valid number.", .line, .field)]
    InvalidNumber { line: usize, field: String },

    #[error("Error reading or writing instructions: {}", .0)]
    Io(#[from] std::io::Error),
}

impl InstructionError {
    ///
    /// # Returns:
    /// - The one-based line the error occurred on, if it came from a specific line
    ///
    pub fn line(&self) -> Option<usize> {
        match self {
            InstructionError::Malformed { line, .. }
            | InstructionError::FieldCount { line, .. }
            | InstructionError::InvalidNumber { line, .. } => Some(*line),
            InstructionError::Io(_) => None,
        }
    }
}
