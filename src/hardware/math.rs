
///
/// Converts cartesian into belt lengths. The calculated belt lengths are
/// relative to the motor shafts, with the left shaft at the origin and the right
/// shaft at (`motor_interspace`, 0). Units are whatever the caller uses for all
/// three parameters, steps in this crate.
///
/// # Parameters:
/// - `x`: The x parameter of the cartesian coordinate, horizontally relative to the left motor
/// - `y`: The y parameter of the cartesian coordinate, vertically relative to the left motor
/// - `motor_interspace`: The distance between the two motor shafts
///
/// # Returns:
/// - A tuple containing the unrounded left and right belt lengths, respectively
///
pub fn cartesian_to_belt(x: f64, y: f64, motor_interspace: f64) -> (f64, f64) {
    let left_belt = f64::hypot(x, y);
    let right_belt = f64::hypot(motor_interspace - x, y);

    (left_belt, right_belt)
}

///
/// Converts belt lengths into cartesian coordinates. The calculated cartesian coordinates are
/// relative to the left motor shaft (0, 0), and grow downwards/rightwards.
///
/// # Parameters:
/// - `left_length`: The length of the left motor belt, relative to the left motor shaft
/// - `right_length`: The length of the right motor belt, relative to the right motor shaft
/// - `motor_interspace`: The distance between the two motor shafts
///
/// # Returns:
/// - A tuple containing the x and y coordinates, respectively. `y` is NaN when the
///   three lengths cannot form a triangle.
///
pub fn belt_to_cartesian(left_length: f64, right_length: f64, motor_interspace: f64) -> (f64, f64) {
    let x = (f64::powi(motor_interspace, 2) + f64::powi(left_length, 2) - f64::powi(right_length, 2)) / (2. * motor_interspace);
    let y = f64::sqrt(f64::powi(left_length, 2) - f64::powi(x, 2));

    (x, y)
}

///
/// Calculates the length of belt moved by a single motor step.
///
/// # Parameters:
/// - `belt_tooth_distance`: The pitch of the belt teeth, in millimetres
/// - `tooth_on_gear`: The number of teeth on the motor gear
/// - `steps_per_rev`: The number of motor steps required for one revolution
///
/// # Returns:
/// - The millimetres moved per step, or `None` if `steps_per_rev` is zero
///
pub fn mm_per_step(belt_tooth_distance: f64, tooth_on_gear: u32, steps_per_rev: u32) -> Option<f64> {
    if steps_per_rev == 0 {
        return None;
    }

    Some(belt_tooth_distance * tooth_on_gear as f64 / steps_per_rev as f64)
}

///
/// Calculates the number of steps required to move the belt one millimetre. This is the
/// reciprocal of `mm_per_step`, computed directly from the calibration so that whole-millimetre
/// settings convert to steps without an intermediate rounding.
///
/// # Returns:
/// - The steps per millimetre, or `None` if one belt tooth per gear revolution moves no belt
///
pub fn steps_per_mm(belt_tooth_distance: f64, tooth_on_gear: u32, steps_per_rev: u32) -> Option<f64> {
    let mm_per_rev = belt_tooth_distance * tooth_on_gear as f64;
    if mm_per_rev == 0. {
        return None;
    }

    Some(steps_per_rev as f64 / mm_per_rev)
}

///
/// Converts a millimetre value into whole steps, truncating toward zero.
///
pub fn mm_to_steps(mm: f64, steps_per_mm: f64) -> i64 {
    (mm * steps_per_mm).trunc() as i64
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_point_has_equal_belts() {
        let (l, r) = cartesian_to_belt(500., 800., 1000.);
        assert!((l - r).abs() < 1e-12);
        assert_eq!(l.round(), 943.);
    }

    #[test]
    fn huge_coordinates_stay_finite() {
        let (l, r) = cartesian_to_belt(1e200, 1e200, 1000.);
        assert!(l.is_finite() && r.is_finite());
        assert!((l / 1e200 - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn belt_cartesian_inverse() {
        let (l, r) = cartesian_to_belt(120., 430., 1000.);
        let (x, y) = belt_to_cartesian(l, r, 1000.);
        assert!((x - 120.).abs() < 1e-9);
        assert!((y - 430.).abs() < 1e-9);
    }

    #[test]
    fn impossible_triangle_is_nan() {
        let (_, y) = belt_to_cartesian(10., 10., 1000.);
        assert!(y.is_nan());
    }

    #[test]
    fn stock_mm_per_step() {
        let mps = mm_per_step(2., 20, 3200).unwrap();
        assert!((mps - 0.0125).abs() < 1e-9);
    }

    #[test]
    fn stock_steps_per_mm_is_exact() {
        assert_eq!(steps_per_mm(2., 20, 3200), Some(80.));
        assert_eq!(mm_to_steps(580., 80.), 46400);
    }

    #[test]
    fn zero_steps_per_rev() {
        assert!(mm_per_step(2., 20, 0).is_none());
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(mm_to_steps(1.019, 100.), 101);
        assert_eq!(mm_to_steps(-1.019, 100.), -101);
    }
}
