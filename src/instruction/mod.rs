//!
//! Path input tokenizing and step output representation
//!

use std::io::BufRead;

use error::InstructionError;

use crate::kinematics::StepDelta;

pub mod error;
pub mod writer;

///
/// A non-geometric command in a path. These are never moved to, only forwarded to the output.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Pause,
    PenUp,
    PenDown,
}

impl Control {
    ///
    /// # Returns:
    /// - The keyword used for the command in path files
    ///
    pub fn keyword(&self) -> &'static str {
        match self {
            Control::Pause => "PAUSE",
            Control::PenUp => "PENUP",
            Control::PenDown => "PENDOWN",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Control> {
        match keyword {
            "PAUSE" => Some(Control::Pause),
            "PENUP" => Some(Control::PenUp),
            "PENDOWN" => Some(Control::PenDown),
            _ => None,
        }
    }
}

///
/// A single instruction of an input path.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathElement {
    Point { x: f64, y: f64 },
    Control(Control),
}

///
/// A path element together with the line it was read from.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceElement {
    pub line: usize,
    pub element: PathElement,
}

///
/// A single instruction of the output stream, one per processed path element.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputElement {
    Steps(StepDelta),
    Marker(Control),
}

///
/// Tokenizes a single path line. Carriage returns and surrounding whitespace are stripped first.
///
/// # Parameters:
/// - `line_no`: The one-based line number, used in errors
/// - `line`: The raw line
///
/// # Returns:
/// - `None` for a blank line
/// - The path element on the line
/// - An `InstructionError` if the line is neither a keyword nor exactly two numbers
///
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<PathElement>, InstructionError> {
    let line = line.replace('\r', "");
    let line = line.trim();

    if line.is_empty() {
        return Ok(None);
    }

    if let Some(control) = Control::from_keyword(line) {
        return Ok(Some(PathElement::Control(control)));
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 2 {
        if fields.iter().any(|field| field.parse::<f64>().is_err()) {
            return Err(InstructionError::Malformed { line: line_no, content: line.to_owned() });
        }
        return Err(InstructionError::FieldCount { line: line_no, found: fields.len() });
    }

    let parse = |field: &str| {
        field.parse::<f64>().map_err(|_| InstructionError::InvalidNumber { line: line_no, field: field.to_owned() })
    };

    Ok(Some(PathElement::Point { x: parse(fields[0])?, y: parse(fields[1])? }))
}

///
/// Tokenizes a whole path stream. Reading stops at the first malformed line.
///
/// # Parameters:
/// - `reader`: The path text, one instruction per line
///
/// # Returns:
/// - The path elements with their line numbers, blank lines skipped
/// - An `InstructionError` for the first malformed line, including one that is not valid UTF-8,
/// or a read failure
///
pub fn read_path<R: BufRead>(reader: R) -> Result<Vec<SourceElement>, InstructionError> {
    let mut elements = Vec::new();

    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let bytes = bytes?;

        let line = std::str::from_utf8(&bytes).map_err(|_| InstructionError::Malformed {
            line: line_no,
            content: String::from_utf8_lossy(&bytes).trim().to_owned(),
        })?;

        if let Some(element) = parse_line(line_no, line)? {
            elements.push(SourceElement { line: line_no, element });
        }
    }

    Ok(elements)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(parse_line(1, "PAUSE").unwrap(), Some(PathElement::Control(Control::Pause)));
        assert_eq!(parse_line(1, "PENUP").unwrap(), Some(PathElement::Control(Control::PenUp)));
        assert_eq!(parse_line(1, "PENDOWN\r").unwrap(), Some(PathElement::Control(Control::PenDown)));
    }

    #[test]
    fn keywords_are_exact() {
        assert!(matches!(parse_line(3, "penup"), Err(InstructionError::Malformed { line: 3, .. })));
        assert!(matches!(parse_line(3, "PEN UP"), Err(InstructionError::InvalidNumber { line: 3, .. })));
    }

    #[test]
    fn coordinate_pair() {
        assert_eq!(parse_line(1, "12.5 -3\r").unwrap(), Some(PathElement::Point { x: 12.5, y: -3. }));
        assert_eq!(parse_line(1, "  1e3\t 40 ").unwrap(), Some(PathElement::Point { x: 1000., y: 40. }));
    }

    #[test]
    fn single_field_is_malformed() {
        let err = parse_line(7, "12.5").unwrap_err();
        assert!(matches!(err, InstructionError::FieldCount { line: 7, found: 1 }));
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn three_fields_is_malformed() {
        assert!(matches!(parse_line(2, "1 2 3"), Err(InstructionError::FieldCount { found: 3, .. })));
    }

    #[test]
    fn bad_number() {
        match parse_line(4, "12.5 abc") {
            Err(InstructionError::InvalidNumber { line, field }) => {
                assert_eq!(line, 4);
                assert_eq!(field, "abc");
            }
            other => panic!("expected an invalid number, got {:?}", other),
        }
    }

    #[test]
    fn blank_lines_skipped() {
        assert_eq!(parse_line(1, "").unwrap(), None);
        assert_eq!(parse_line(1, " \r").unwrap(), None);
    }

    #[test]
    fn read_whole_path() {
        let path = "PENUP\r\n10 20\r\n\r\nPENDOWN\n30 40\n";
        let elements = read_path(path.as_bytes()).unwrap();

        assert_eq!(elements, vec![
            SourceElement { line: 1, element: PathElement::Control(Control::PenUp) },
            SourceElement { line: 2, element: PathElement::Point { x: 10., y: 20. } },
            SourceElement { line: 4, element: PathElement::Control(Control::PenDown) },
            SourceElement { line: 5, element: PathElement::Point { x: 30., y: 40. } },
        ]);
    }

    #[test]
    fn invalid_utf8_line_is_malformed() {
        let path: &[u8] = b"10 20\r\n\xff\xfe 1\r\n30 40\n";
        let err = read_path(path).unwrap_err();

        assert!(matches!(err, InstructionError::Malformed { line: 2, .. }));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn read_stops_at_malformed_line() {
        let path = "10 20\n12.5\n30 40\n";
        let err = read_path(path.as_bytes()).unwrap_err();

        assert_eq!(err.line(), Some(2));
    }
}
