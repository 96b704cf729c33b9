//!
//! Image-based preview generation, replaying emitted steps through the belt geometry
//!

use std::path::Path;

use error::PreviewError;

use crate::hardware::MachineGeometry;
use crate::instruction::{Control, OutputElement};

pub mod belts;
pub mod canvas;
pub mod error;

///
/// Performs the provided motor instructions on a canvas the size of the paper. Only moves made
/// with the pen down are drawn; the pen is taken to be down until the first PENUP.
///
/// # Parameters:
/// - `geometry`: The machine geometry the steps were generated for
/// - `elements`: The relative output elements, in order
/// - `scale`: Pixels per millimetre
///
/// # Returns:
/// - The rendered canvas
/// - `PreviewError::Unreachable` if the steps lead to belt lengths that cannot meet
/// - `PreviewError::CanvasTooLarge` if the scaled paper does not fit in an image
///
pub fn render_preview(geometry: &MachineGeometry, elements: &[OutputElement], scale: u32) -> Result<canvas::PreviewCanvas, PreviewError> {
    let paper = geometry.paper_dimensions();
    let width = geometry.steps_to_mm(paper.width as f64).round() as u32;
    let height = geometry.steps_to_mm(paper.height as f64).round() as u32;
    let mut preview_canvas = canvas::PreviewCanvas::new(width, height, Some(scale))
        .ok_or(PreviewError::CanvasTooLarge { width, height, scale })?;

    let origin = *geometry.paper_offset_calculated();
    let to_paper_mm = |(x, y): (f64, f64)| (geometry.steps_to_mm(x - origin.x as f64), geometry.steps_to_mm(y - origin.y as f64));

    let mut belts = belts::Belts::new_by_length(*geometry.start_distance(), *geometry.motor_separation());
    let mut last_xy = to_paper_mm(belts.get_as_cartesian());
    let mut pen_down = true;
    let mut strokes = 0_usize;

    for (index, element) in elements.iter().enumerate() {
        let delta = match element {
            OutputElement::Steps(delta) => delta,
            OutputElement::Marker(Control::PenUp) => { pen_down = false; continue; }
            OutputElement::Marker(Control::PenDown) => { pen_down = true; continue; }
            OutputElement::Marker(Control::Pause) => continue,
        };

        belts.move_by_steps(*delta);
        let (x, y) = belts.get_as_cartesian();

        if x.is_nan() || y.is_nan() {
            let lengths = belts.get_lengths();
            return Err(PreviewError::Unreachable { index, left: lengths.left, right: lengths.right });
        }

        let xy = to_paper_mm((x, y));
        if pen_down {
            preview_canvas.line(last_xy.0, last_xy.1, xy.0, xy.1);
            strokes += 1;
        }
        last_xy = xy;
    }

    tracing::debug!(strokes, width = preview_canvas.width, height = preview_canvas.height, "rendered preview");
    Ok(preview_canvas)
}

///
/// Renders a preview and saves it as a PNG.
///
/// # Parameters:
/// - `path`: The path to save the preview image to - *no checks are done to confirm the directory exists*
///
pub fn generate_preview(geometry: &MachineGeometry, elements: &[OutputElement], path: &Path, scale: u32) -> Result<(), PreviewError> {
    let preview_canvas = render_preview(geometry, elements, scale)?;

    preview_canvas
        .save(path)
        .map_err(|source| PreviewError::Save { path: path.to_owned(), source })?;

    tracing::info!(path = %path.display(), "saved preview");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConvertOptions, convert_elements, prepare_path};
    use crate::hardware::{BeltLengths, CalibrationParams, MotorDir, PaperSize};
    use crate::kinematics::StepDelta;

    fn unit_geometry() -> MachineGeometry {
        CalibrationParams::new(
            1, 1, 1., 1000.,
            BeltLengths { left: 943., right: 943. },
            PaperSize { width: 400., height: 300. },
            50.,
            MotorDir { left: 1, right: 1 },
        )
        .derive()
        .unwrap()
    }

    fn darkest_in_column(preview: &canvas::PreviewCanvas, x: u32, rows: std::ops::RangeInclusive<u32>) -> u8 {
        rows.filter_map(|y| preview.shade_at(x, y)).min().unwrap_or(255)
    }

    #[test]
    fn draws_pen_down_strokes_only() {
        let geometry = unit_geometry();
        let origin = *geometry.paper_offset_calculated();

        // pen up move to (10, 10) on the paper, then a pen down stroke to (90, 10)
        let path = format!(
            "PENUP\n{} {}\nPENDOWN\n{} {}\n",
            origin.x + 10, origin.y + 10, origin.x + 90, origin.y + 10
        );
        let elements = prepare_path(path.as_bytes(), &geometry, &ConvertOptions::default()).unwrap();
        let output = convert_elements(&geometry, &elements).unwrap();

        let preview = render_preview(&geometry, &output, 1).unwrap();
        assert_eq!((preview.width, preview.height), (400, 300));

        assert!(darkest_in_column(&preview, 50, 7..=13) < 255);
        assert_eq!(darkest_in_column(&preview, 50, 100..=200), 255);
    }

    #[test]
    fn impossible_replay_fails() {
        let geometry = unit_geometry();
        let output = [OutputElement::Steps(StepDelta::new(900, 0))];

        match render_preview(&geometry, &output, 1) {
            Err(PreviewError::Unreachable { index, left, right }) => {
                assert_eq!(index, 0);
                assert_eq!((left, right), (43, 943));
            }
            Err(err) => panic!("expected an unreachable replay, got {}", err),
            Ok(_) => panic!("expected an unreachable replay"),
        }
    }

    #[test]
    fn huge_scale_fails_cleanly() {
        let geometry = unit_geometry();

        match render_preview(&geometry, &[], u32::MAX) {
            Err(PreviewError::CanvasTooLarge { width, height, scale }) => {
                assert_eq!((width, height, scale), (400, 300, u32::MAX));
            }
            Err(err) => panic!("expected an oversized canvas, got {}", err),
            Ok(_) => panic!("expected an oversized canvas"),
        }
    }

    #[test]
    fn saves_png() {
        let geometry = unit_geometry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");

        generate_preview(&geometry, &[], &path, 2).unwrap();
        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (800, 600));
    }
}
