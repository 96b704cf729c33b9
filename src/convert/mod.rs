//!
//! The conversion entry point: path text in, motor step text out
//!

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use error::ConvertError;

use crate::hardware::{CalibrationParams, MachineGeometry};
use crate::instruction::writer::{StepMode, StepWriter};
use crate::instruction::{OutputElement, PathElement, SourceElement, read_path};
use crate::kinematics::{BeltState, KinematicsEngine};

pub mod error;
pub mod pen;

///
/// Options which adjust the path before it reaches the kinematics engine, and the output format.
///
/// # Fields:
/// - `fit`: Scale the path onto the paper. Without it, coordinates are taken as steps relative to
/// the left motor shaft
/// - `min_pen_pickup`: Drop redundant pen commands and keep the pen down over short hops
/// - `pen_pickup_threshold`: The shortest pen-up travel kept by `min_pen_pickup`, in path units
/// - `mode`: Relative or absolute step lines
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvertOptions {
    pub fit: bool,
    pub min_pen_pickup: bool,
    pub pen_pickup_threshold: f64,
    pub mode: StepMode,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions { fit: false, min_pen_pickup: false, pen_pickup_threshold: 2., mode: StepMode::Relative }
    }
}

///
/// Counts of what a conversion produced.
///
/// # Fields:
/// - `elements`: The number of output lines
/// - `points`: The number of step lines
/// - `markers`: The number of control markers
/// - `final_belts`: The belt lengths after the last point
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertSummary {
    pub elements: usize,
    pub points: usize,
    pub markers: usize,
    pub final_belts: BeltState,
}

///
/// Scales every point onto the paper. Each axis is mapped independently from `[0, max]` onto the
/// paper bounds, where `max` is the largest coordinate of the path on that axis, then clamped to
/// the paper.
///
/// # Parameters:
/// - `elements`: The path, modified in place
/// - `geometry`: The machine geometry providing the paper bounds
///
pub fn fit_to_paper(elements: &mut [SourceElement], geometry: &MachineGeometry) {
    let (max_x, max_y) = elements.iter().fold((0_f64, 0_f64), |(max_x, max_y), source| match source.element {
        PathElement::Point { x, y } => (max_x.max(x), max_y.max(y)),
        PathElement::Control(_) => (max_x, max_y),
    });

    let (top_left, bottom_right) = geometry.paper_bounds();
    let remap = |value: f64, max: f64, low: i64, high: i64| {
        let (low, high) = (low as f64, high as f64);
        if max <= 0. {
            return low;
        }
        (low + value * (high - low) / max).clamp(low, high)
    };

    for source in elements.iter_mut() {
        if let PathElement::Point { x, y } = source.element {
            source.element = PathElement::Point {
                x: remap(x, max_x, top_left.x, bottom_right.x),
                y: remap(y, max_y, top_left.y, bottom_right.y),
            };
        }
    }

    tracing::debug!(max_x, max_y, ?top_left, ?bottom_right, "fitted path to paper");
}

///
/// Logs points that fall outside the span between the motors. They are still converted.
///
fn warn_out_of_span(elements: &[SourceElement], motor_separation: i64) {
    let mut outside = elements.iter().filter(|source| match source.element {
        PathElement::Point { x, .. } => x < 0. || x > motor_separation as f64,
        PathElement::Control(_) => false,
    });

    if let Some(first) = outside.next() {
        tracing::warn!(
            first_line = first.line,
            count = outside.count() + 1,
            motor_separation,
            "points lie outside the span between the motors"
        );
    }
}

///
/// Reads a path and applies the conversion options to it, ready for the engine.
///
/// # Returns:
/// - The prepared path
/// - `ConvertError::Input` if the path could not be read or contains a malformed line
///
pub fn prepare_path<R: BufRead>(reader: R, geometry: &MachineGeometry, options: &ConvertOptions) -> Result<Vec<SourceElement>, ConvertError> {
    let mut elements = read_path(reader)?;

    if options.min_pen_pickup {
        elements = pen::minimize_pen_pickups(elements, options.pen_pickup_threshold);
    }

    if options.fit {
        fit_to_paper(&mut elements, geometry);
    } else {
        warn_out_of_span(&elements, *geometry.motor_separation());
    }

    Ok(elements)
}

///
/// Runs a prepared path through a fresh kinematics engine, collecting the output in memory.
///
/// # Returns:
/// - One output element per path element, in order
/// - `ConvertError::Kinematics` for the first element the engine rejects
///
pub fn convert_elements(geometry: &MachineGeometry, elements: &[SourceElement]) -> Result<Vec<OutputElement>, ConvertError> {
    let mut engine = KinematicsEngine::from_geometry(geometry);

    elements
        .iter()
        .enumerate()
        .map(|(index, source)| {
            engine
                .process(&source.element)
                .map_err(|err| ConvertError::Kinematics { index, line: source.line, source: err })
        })
        .collect()
}

///
/// Converts a path into motor steps. Each element is written as soon as it is processed, so if
/// the engine fails part way, everything before the failing element has already been written.
///
/// # Parameters:
/// - `params`: The machine calibration
/// - `reader`: The path text
/// - `writer`: The step output
/// - `options`: The conversion options
///
/// # Returns:
/// - A summary of the conversion
/// - A `ConvertError`, including the element index and line where relevant
///
pub fn convert<R: BufRead, W: Write>(params: &CalibrationParams, reader: R, writer: W, options: &ConvertOptions) -> Result<ConvertSummary, ConvertError> {
    let geometry = params.derive()?;
    let elements = prepare_path(reader, &geometry, options)?;

    let mut engine = KinematicsEngine::from_geometry(&geometry);
    let mut step_writer = StepWriter::new(writer, params, options.mode);
    let mut summary = ConvertSummary { elements: 0, points: 0, markers: 0, final_belts: engine.belt_state() };

    let result = elements.iter().enumerate().try_for_each(|(index, source)| -> Result<(), ConvertError> {
        let output = engine
            .process(&source.element)
            .map_err(|err| ConvertError::Kinematics { index, line: source.line, source: err })?;

        step_writer.write_element(&output).map_err(|err| ConvertError::Output { index, source: err })?;

        summary.elements += 1;
        match output {
            OutputElement::Steps(_) => summary.points += 1,
            OutputElement::Marker(_) => summary.markers += 1,
        }
        Ok(())
    });

    // keep whatever was produced before a failure
    let flushed = step_writer.flush();
    result?;
    flushed.map_err(|err| ConvertError::Output { index: summary.elements, source: err })?;

    summary.final_belts = engine.belt_state();
    tracing::info!(elements = summary.elements, points = summary.points, markers = summary.markers, "converted path to steps");

    Ok(summary)
}

///
/// Path based wrapper around `convert`.
///
/// # Parameters:
/// - `settings_path`: The JSON settings file
/// - `input_path`: The path file, one instruction per line
/// - `output_path`: The step file to create, overwritten if it exists
/// - `options`: The conversion options
///
pub fn convert_files(settings_path: &Path, input_path: &Path, output_path: &Path, options: &ConvertOptions) -> Result<ConvertSummary, ConvertError> {
    let params = CalibrationParams::load(settings_path)?;

    let input = File::open(input_path).map_err(|source| ConvertError::File { path: input_path.to_owned(), source })?;
    let output = File::create(output_path).map_err(|source| ConvertError::File { path: output_path.to_owned(), source })?;

    convert(&params, BufReader::new(input), BufWriter::new(output), options)
}
