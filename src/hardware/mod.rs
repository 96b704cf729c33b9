//!
//! Physical hardware representations and unit calibration
//!

use std::io::Read;
use std::path::Path;

use error::CalibrationError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::kinematics::BeltState;

pub mod error;
pub mod math;

///
/// A pair of millimetre lengths, one per belt. Read from settings as a `[left, right]` array.
///
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct BeltLengths {
    pub left: f64,
    pub right: f64,
}

impl From<[f64; 2]> for BeltLengths {
    fn from([left, right]: [f64; 2]) -> Self {
        BeltLengths { left, right }
    }
}

///
/// The paper size in millimetres. Read from settings as a `[width, height]` array.
///
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct PaperSize {
    pub width: f64,
    pub height: f64,
}

impl From<[f64; 2]> for PaperSize {
    fn from([width, height]: [f64; 2]) -> Self {
        PaperSize { width, height }
    }
}

///
/// The rotation sign of each motor, either 1 or -1. Read from settings as a `[left, right]` array
/// of whole numbers, which may be written as `1.0`.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "[f64; 2]")]
pub struct MotorDir {
    pub left: i8,
    pub right: i8,
}

impl TryFrom<[f64; 2]> for MotorDir {
    type Error = String;

    fn try_from([left, right]: [f64; 2]) -> Result<Self, Self::Error> {
        Ok(MotorDir { left: whole_number(left)?, right: whole_number(right)? })
    }
}

///
/// Converts a settings number into an integer, accepting integral floats such as `20.0`.
///
/// # Returns:
/// - The integer value
/// - An error message if the value has a fractional part or does not fit `T`
///
fn whole_number<T: TryFrom<i64>>(value: f64) -> Result<T, String> {
    if !value.is_finite() || value.fract() != 0. {
        return Err(format!("expected a whole number, got {}", value));
    }
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(format!("{} is out of range", value));
    }

    T::try_from(value as i64).map_err(|_| format!("{} is out of range", value))
}

fn deserialize_whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = f64::deserialize(deserializer)?;
    whole_number(value).map_err(D::Error::custom)
}

///
/// A width/height pair, in steps.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepExtent {
    pub width: i64,
    pub height: i64,
}

///
/// A position in steps, relative to the left motor shaft, growing rightwards/downwards.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepPoint {
    pub x: i64,
    pub y: i64,
}

///
/// The machine calibration, as written in the settings file. All lengths are in millimetres.
/// All features have an associated getter function.
///
/// # Fields:
/// - `tooth_on_gear`: The number of teeth on each motor gear
/// - `steps_per_rev`: The number of motor steps for one revolution (200 full step, 3200 1/16 step)
/// - `belt_tooth_distance`: The distance between two teeth on the belt
/// - `motor_separation`: The horizontal distance between the motor shafts
/// - `start_distance`: The belt lengths with the pen at its start position
/// - `paper_size`: The usable paper dimensions, after padding
/// - `paper_offset`: The distance between the pen start position and the bottom of the paper above it
/// - `motor_dir`: The direction correction of each motor
/// - `pen_up_angle`: The servo angle written with pen up markers
/// - `pen_down_angle`: The servo angle written with pen down markers
///
#[derive(Clone, Debug, PartialEq, Deserialize, getset::Getters)]
#[get = "pub"]
#[serde(rename_all = "camelCase")]
pub struct CalibrationParams {
    #[serde(alias = "toothOngear", deserialize_with = "deserialize_whole_number")]
    tooth_on_gear: u32,
    #[serde(deserialize_with = "deserialize_whole_number")]
    steps_per_rev: u32,
    belt_tooth_distance: f64,
    #[serde(rename = "distanceBetweenMotors")]
    motor_separation: f64,
    start_distance: BeltLengths,
    paper_size: PaperSize,
    paper_offset: f64,
    motor_dir: MotorDir,
    #[serde(default = "default_pen_up_angle")]
    pen_up_angle: i32,
    #[serde(default)]
    pen_down_angle: i32,
}

fn default_pen_up_angle() -> i32 {
    45
}

impl Default for CalibrationParams {
    fn default() -> Self {
        CalibrationParams {
            tooth_on_gear: 20,
            steps_per_rev: 3200,
            belt_tooth_distance: 2.,
            motor_separation: 580.,
            start_distance: BeltLengths { left: 590., right: 590. },
            paper_size: PaperSize { width: 190., height: 270. },
            paper_offset: 35.,
            motor_dir: MotorDir { left: 1, right: -1 },
            pen_up_angle: default_pen_up_angle(),
            pen_down_angle: 0,
        }
    }
}

impl CalibrationParams {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tooth_on_gear: u32,
        steps_per_rev: u32,
        belt_tooth_distance: f64,
        motor_separation: f64,
        start_distance: BeltLengths,
        paper_size: PaperSize,
        paper_offset: f64,
        motor_dir: MotorDir,
    ) -> CalibrationParams {
        CalibrationParams {
            tooth_on_gear,
            steps_per_rev,
            belt_tooth_distance,
            motor_separation,
            start_distance,
            paper_size,
            paper_offset,
            motor_dir,
            pen_up_angle: default_pen_up_angle(),
            pen_down_angle: 0,
        }
    }

    ///
    /// Sets the servo angles written alongside pen markers.
    ///
    pub fn with_pen_angles(mut self, up: i32, down: i32) -> CalibrationParams {
        self.pen_up_angle = up;
        self.pen_down_angle = down;
        self
    }

    ///
    /// Parses a settings JSON document.
    ///
    /// # Returns:
    /// - The calibration parameters
    /// - `CalibrationError::Configuration` if a key is missing or has the wrong type
    ///
    pub fn from_json_str(json: &str) -> Result<CalibrationParams, CalibrationError> {
        serde_json::from_str(json).map_err(|err| CalibrationError::config("settings", err.to_string()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<CalibrationParams, CalibrationError> {
        serde_json::from_reader(reader).map_err(|err| CalibrationError::config("settings", err.to_string()))
    }

    ///
    /// Loads the settings file from disk.
    ///
    /// # Parameters:
    /// - `path`: The path of the JSON settings file
    ///
    pub fn load(path: &Path) -> Result<CalibrationParams, CalibrationError> {
        let file = std::fs::File::open(path)
            .map_err(|err| CalibrationError::config("settings", format!("could not open {}: {}", path.display(), err)))?;

        Self::from_reader(std::io::BufReader::new(file))
    }

    ///
    /// The distance the belt moves for one motor step.
    ///
    /// # Returns:
    /// - The millimetres per step
    /// - `CalibrationError::Configuration` if the calibration would divide by zero
    ///
    pub fn mm_per_step(&self) -> Result<f64, CalibrationError> {
        let mm_per_step = math::mm_per_step(self.belt_tooth_distance, self.tooth_on_gear, self.steps_per_rev)
            .ok_or_else(|| CalibrationError::config("stepsPerRev", "must be greater than zero"))?;

        if mm_per_step == 0. {
            return Err(CalibrationError::config("beltToothDistance", "the belt would not move per step"));
        }

        Ok(mm_per_step)
    }

    ///
    /// Checks every field is usable before any unit conversion takes place.
    ///
    fn validate(&self) -> Result<(), CalibrationError> {
        if self.tooth_on_gear == 0 {
            return Err(CalibrationError::config("toothOnGear", "must be greater than zero"));
        }
        if self.steps_per_rev == 0 {
            return Err(CalibrationError::config("stepsPerRev", "must be greater than zero"));
        }

        let positive = [
            ("beltToothDistance", self.belt_tooth_distance),
            ("distanceBetweenMotors", self.motor_separation),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0. {
                return Err(CalibrationError::config(field, format!("must be a positive number, got {}", value)));
            }
        }

        let finite = [
            ("startDistance", self.start_distance.left),
            ("startDistance", self.start_distance.right),
            ("paperSize", self.paper_size.width),
            ("paperSize", self.paper_size.height),
            ("paperOffset", self.paper_offset),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(CalibrationError::config(field, format!("must be a finite number, got {}", value)));
            }
        }

        for dir in [self.motor_dir.left, self.motor_dir.right] {
            if dir != 1 && dir != -1 {
                return Err(CalibrationError::config("motorDir", format!("must be 1 or -1, got {}", dir)));
            }
        }

        Ok(())
    }

    ///
    /// Converts the calibration into step units. Millimetre values are divided by the millimetres
    /// per step and truncated toward zero to whole steps.
    ///
    /// # Returns:
    /// - The machine geometry in steps
    /// - `CalibrationError::Configuration` for a missing or zero field
    /// - `CalibrationError::Geometry` if the start belt is shorter than half the motor separation
    ///
    pub fn derive(&self) -> Result<MachineGeometry, CalibrationError> {
        self.validate()?;

        let mm_per_step = self.mm_per_step()?;
        let steps_per_mm = math::steps_per_mm(self.belt_tooth_distance, self.tooth_on_gear, self.steps_per_rev)
            .ok_or_else(|| CalibrationError::config("toothOnGear", "the belt would not move per step"))?;
        let to_steps = |mm: f64| math::mm_to_steps(mm, steps_per_mm);

        let motor_separation = to_steps(self.motor_separation);
        let start_distance = BeltState::new(to_steps(self.start_distance.left), to_steps(self.start_distance.right));
        let paper_dimensions = StepExtent { width: to_steps(self.paper_size.width), height: to_steps(self.paper_size.height) };
        let paper_offset = to_steps(self.paper_offset);

        let half_separation = motor_separation as f64 / 2.;
        let radicand = f64::powi(start_distance.left as f64, 2) - f64::powi(half_separation, 2);
        if radicand < 0. {
            return Err(CalibrationError::Geometry { start_distance: start_distance.left, half_separation });
        }
        let start_depth = radicand.sqrt();

        let paper_offset_calculated = StepPoint {
            // whole-step halves, centring the paper between the motors
            x: motor_separation / 2 - paper_dimensions.width / 2,
            y: (start_depth - paper_offset as f64 - paper_dimensions.height as f64).trunc() as i64,
        };
        let pen_home = StepPoint { x: motor_separation / 2, y: start_depth.trunc() as i64 };

        let geometry = MachineGeometry {
            mm_per_step,
            motor_separation,
            start_distance,
            paper_dimensions,
            paper_offset,
            paper_offset_calculated,
            pen_home,
            motor_dir: self.motor_dir,
        };

        tracing::debug!(?geometry, "derived machine geometry");
        Ok(geometry)
    }
}

///
/// The machine layout converted into steps. Produced once per run by `CalibrationParams::derive`.
/// All features have an associated getter function.
///
/// # Fields:
/// - `mm_per_step`: The belt length moved per step, in millimetres
/// - `motor_separation`: The horizontal distance between the motor shafts
/// - `start_distance`: The belt lengths with the pen at its start position
/// - `paper_dimensions`: The paper width and height
/// - `paper_offset`: The distance between the pen start position and the bottom of the paper
/// - `paper_offset_calculated`: The top left corner of the paper, relative to the left motor shaft
/// - `pen_home`: The pen start position, relative to the left motor shaft
/// - `motor_dir`: The direction correction of each motor
///
#[derive(Clone, Copy, Debug, PartialEq, getset::Getters)]
#[get = "pub"]
pub struct MachineGeometry {
    mm_per_step: f64,
    motor_separation: i64,
    start_distance: BeltState,
    paper_dimensions: StepExtent,
    paper_offset: i64,
    paper_offset_calculated: StepPoint,
    pen_home: StepPoint,
    motor_dir: MotorDir,
}

impl MachineGeometry {
    ///
    /// # Returns:
    /// - The top left and bottom right corners of the paper, in steps
    ///
    pub fn paper_bounds(&self) -> (StepPoint, StepPoint) {
        let top_left = self.paper_offset_calculated;
        let bottom_right = StepPoint {
            x: top_left.x + self.paper_dimensions.width,
            y: top_left.y + self.paper_dimensions.height,
        };

        (top_left, bottom_right)
    }

    pub fn steps_to_mm(&self, steps: f64) -> f64 {
        steps * self.mm_per_step
    }
}
