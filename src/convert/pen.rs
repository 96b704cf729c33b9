use crate::instruction::{Control, PathElement, SourceElement};

///
/// Removes pen commands which do not change the pen state, e.g. a PENUP while the pen is
/// already up. The first pen command is always kept, as the starting pen state is unknown.
///
pub fn drop_redundant_pen_commands(elements: Vec<SourceElement>) -> Vec<SourceElement> {
    let mut pen_down: Option<bool> = None;

    elements
        .into_iter()
        .filter(|source| {
            let lowered = match source.element {
                PathElement::Control(Control::PenDown) => true,
                PathElement::Control(Control::PenUp) => false,
                _ => return true,
            };

            let changes = pen_down != Some(lowered);
            pen_down = Some(lowered);
            changes
        })
        .collect()
}

///
/// Keeps the pen down over short pen-up moves. A PENUP..PENDOWN span whose travel, measured
/// from the last point before the PENUP through every point in the span, is shorter than
/// `threshold` loses both pen commands. Spans interrupted by a PAUSE are left as they are.
///
/// # Parameters:
/// - `elements`: The path
/// - `threshold`: The minimum travel worth lifting the pen for, in path units
///
/// # Returns:
/// - The simplified path
///
pub fn minimize_pen_pickups(elements: Vec<SourceElement>, threshold: f64) -> Vec<SourceElement> {
    let elements = drop_redundant_pen_commands(elements);
    let mut removed = vec![false; elements.len()];
    let mut last_point: Option<(f64, f64)> = None;

    for (idx, source) in elements.iter().enumerate() {
        match source.element {
            PathElement::Point { x, y } => last_point = Some((x, y)),
            PathElement::Control(Control::PenUp) => {
                let (Some(from), Some(down_idx)) = (last_point, find_pen_down(&elements, idx)) else {
                    continue;
                };

                if span_travel(from, &elements[idx + 1..down_idx]) < threshold {
                    removed[idx] = true;
                    removed[down_idx] = true;
                }
            }
            PathElement::Control(_) => {}
        }
    }

    let before = elements.len();
    let kept: Vec<SourceElement> = elements
        .into_iter()
        .zip(removed)
        .filter_map(|(source, removed)| (!removed).then_some(source))
        .collect();

    tracing::debug!(removed = before - kept.len(), "minimised pen pickups");
    kept
}

///
/// # Returns:
/// - The index of the PENDOWN closing the span opened at `up_idx`, if the span is only points
///
fn find_pen_down(elements: &[SourceElement], up_idx: usize) -> Option<usize> {
    for (idx, source) in elements.iter().enumerate().skip(up_idx + 1) {
        match source.element {
            PathElement::Point { .. } => continue,
            PathElement::Control(Control::PenDown) => return Some(idx),
            PathElement::Control(_) => return None,
        }
    }

    None
}

fn span_travel(from: (f64, f64), span: &[SourceElement]) -> f64 {
    let mut travel = 0.;
    let mut last = from;

    for source in span {
        if let PathElement::Point { x, y } = source.element {
            travel += f64::hypot(x - last.0, y - last.1);
            last = (x, y);
        }
    }

    travel
}


#[cfg(test)]
mod tests {
    use super::*;

    fn path(elements: &[PathElement]) -> Vec<SourceElement> {
        elements.iter().enumerate().map(|(idx, element)| SourceElement { line: idx + 1, element: *element }).collect()
    }

    fn elements(sources: &[SourceElement]) -> Vec<PathElement> {
        sources.iter().map(|source| source.element).collect()
    }

    const UP: PathElement = PathElement::Control(Control::PenUp);
    const DOWN: PathElement = PathElement::Control(Control::PenDown);
    const PAUSE: PathElement = PathElement::Control(Control::Pause);

    fn pt(x: f64, y: f64) -> PathElement {
        PathElement::Point { x, y }
    }

    #[test]
    fn redundant_commands_dropped() {
        let input = path(&[UP, UP, pt(0., 0.), DOWN, DOWN, pt(1., 1.), UP]);
        assert_eq!(elements(&drop_redundant_pen_commands(input)), vec![UP, pt(0., 0.), DOWN, pt(1., 1.), UP]);
    }

    #[test]
    fn short_hop_keeps_pen_down() {
        let input = path(&[DOWN, pt(0., 0.), UP, pt(1., 0.), DOWN, pt(5., 0.)]);
        assert_eq!(elements(&minimize_pen_pickups(input, 2.)), vec![DOWN, pt(0., 0.), pt(1., 0.), pt(5., 0.)]);
    }

    #[test]
    fn long_hop_lifts_pen() {
        let input = path(&[DOWN, pt(0., 0.), UP, pt(1., 0.), pt(1., 3.), DOWN]);
        let output = minimize_pen_pickups(input.clone(), 2.);
        assert_eq!(output, input);
    }

    #[test]
    fn pause_breaks_span() {
        let input = path(&[DOWN, pt(0., 0.), UP, PAUSE, pt(0.5, 0.), DOWN]);
        assert_eq!(minimize_pen_pickups(input.clone(), 2.), input);
    }

    #[test]
    fn lift_before_any_point_is_kept() {
        let input = path(&[UP, pt(0.5, 0.), DOWN, pt(1., 0.)]);
        assert_eq!(minimize_pen_pickups(input.clone(), 2.), input);
    }

    #[test]
    fn line_numbers_survive() {
        let input = path(&[DOWN, pt(0., 0.), UP, DOWN, pt(1., 0.)]);
        let lines: Vec<usize> = minimize_pen_pickups(input, 2.).iter().map(|source| source.line).collect();
        assert_eq!(lines, vec![1, 2, 5]);
    }
}
