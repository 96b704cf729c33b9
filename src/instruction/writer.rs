use std::io::Write;

use crate::hardware::{CalibrationParams, MotorDir};
use crate::kinematics::StepDelta;

use super::error::InstructionError;
use super::{Control, OutputElement};

///
/// How step lines are written.
///
/// - `Relative`: Each line holds the delta for that move
/// - `Absolute`: Each line holds the total motor offset from the start position
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepMode {
    #[default]
    Relative,
    Absolute,
}

///
/// Writes output elements as text, one line each. Step lines are `left,right` with the motor
/// direction applied, pen markers are `PENUP:<angle>` / `PENDOWN:<angle>` and pauses `PAUSE`.
///
/// # Fields:
/// - `writer`: The destination
/// - `motor_dir`: The direction correction of each motor
/// - `pen_up_angle`: The servo angle written with pen up markers
/// - `pen_down_angle`: The servo angle written with pen down markers
/// - `mode`: Relative or absolute step lines
/// - `offset`: The sum of all deltas written so far
///
pub struct StepWriter<W: Write> {
    writer: W,
    motor_dir: MotorDir,
    pen_up_angle: i32,
    pen_down_angle: i32,
    mode: StepMode,
    offset: StepDelta,
}

impl<W: Write> StepWriter<W> {
    pub fn new(writer: W, params: &CalibrationParams, mode: StepMode) -> StepWriter<W> {
        StepWriter {
            writer,
            motor_dir: *params.motor_dir(),
            pen_up_angle: *params.pen_up_angle(),
            pen_down_angle: *params.pen_down_angle(),
            mode,
            offset: StepDelta::ZERO,
        }
    }

    ///
    /// Writes a single element.
    ///
    /// # Returns:
    /// - `InstructionError::Io` if the destination could not be written to
    ///
    pub fn write_element(&mut self, element: &OutputElement) -> Result<(), InstructionError> {
        match element {
            OutputElement::Marker(Control::Pause) => writeln!(self.writer, "{}", Control::Pause.keyword())?,
            OutputElement::Marker(Control::PenUp) => writeln!(self.writer, "{}:{}", Control::PenUp.keyword(), self.pen_up_angle)?,
            OutputElement::Marker(Control::PenDown) => writeln!(self.writer, "{}:{}", Control::PenDown.keyword(), self.pen_down_angle)?,
            OutputElement::Steps(delta) => {
                self.offset = StepDelta::new(self.offset.left + delta.left, self.offset.right + delta.right);

                let steps = match self.mode {
                    StepMode::Relative => *delta,
                    StepMode::Absolute => self.offset,
                };
                writeln!(
                    self.writer,
                    "{},{}",
                    steps.left * self.motor_dir.left as i64,
                    steps.right * self.motor_dir.right as i64
                )?;
            }
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), InstructionError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

///
/// Writes a complete output sequence.
///
/// # Parameters:
/// - `writer`: The destination
/// - `elements`: The output elements, in path order
/// - `params`: The calibration, for motor directions and pen angles
/// - `mode`: Relative or absolute step lines
///
pub fn write_output<W: Write>(writer: W, elements: &[OutputElement], params: &CalibrationParams, mode: StepMode) -> Result<(), InstructionError> {
    let mut step_writer = StepWriter::new(writer, params, mode);
    for element in elements {
        step_writer.write_element(element)?;
    }
    step_writer.flush()
}
