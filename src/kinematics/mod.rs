//!
//! Step-unit belt kinematics: converts pen positions into relative motor commands
//!

use std::ops::Sub;

use error::KinematicsError;

use crate::hardware::MachineGeometry;
use crate::hardware::math::cartesian_to_belt;
use crate::instruction::{OutputElement, PathElement};

pub mod error;

///
/// The current lengths of both belts, in whole steps. The left belt is measured from the left
/// motor shaft, the right belt from the right motor shaft.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BeltState {
    pub left: i64,
    pub right: i64,
}

impl BeltState {
    pub fn new(left: i64, right: i64) -> BeltState {
        BeltState { left, right }
    }

    ///
    /// Applies a delta the way the motors do: a positive delta shortens the belt.
    ///
    /// # Returns:
    /// - The belt state after the move
    ///
    pub fn apply(self, delta: StepDelta) -> BeltState {
        BeltState { left: self.left - delta.left, right: self.right - delta.right }
    }
}

impl Sub for BeltState {
    type Output = StepDelta;

    fn sub(self, rhs: BeltState) -> StepDelta {
        StepDelta { left: self.left - rhs.left, right: self.right - rhs.right }
    }
}

///
/// Signed step counts for both motors for a single move. Positive means the belt shortens; mapping
/// the sign to a physical rotation is left to the writer, using the configured motor directions.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepDelta {
    pub left: i64,
    pub right: i64,
}

impl StepDelta {
    pub const ZERO: StepDelta = StepDelta { left: 0, right: 0 };

    pub fn new(left: i64, right: i64) -> StepDelta {
        StepDelta { left, right }
    }
}

///
/// Tracks the belts of the machine and emits the step deltas needed to follow a path.
/// The belt state is only ever advanced through `step`; nothing else can modify it.
///
/// # Fields:
/// - `motor_separation`: The distance between the motor shafts, in steps
/// - `belts`: The current belt lengths, in steps
///
#[derive(Debug, Clone)]
pub struct KinematicsEngine {
    motor_separation: i64,
    belts: BeltState,
}

impl KinematicsEngine {
    ///
    /// Creates a new engine with the belts at their start lengths.
    ///
    /// # Parameters:
    /// - `motor_separation`: The distance between the motor shafts, in steps
    /// - `start`: The belt lengths with the pen at its start position, in steps
    ///
    pub fn new(motor_separation: i64, start: BeltState) -> KinematicsEngine {
        KinematicsEngine { motor_separation, belts: start }
    }

    pub fn from_geometry(geometry: &MachineGeometry) -> KinematicsEngine {
        KinematicsEngine::new(*geometry.motor_separation(), *geometry.start_distance())
    }

    ///
    /// Moves the pen to a new position, given in steps relative to the left motor shaft.
    /// The new belt lengths are rounded to the nearest step so that no sub-step drift builds up
    /// over a long path.
    ///
    /// # Parameters:
    /// - `x`: The target x position, rightwards from the left motor shaft
    /// - `y`: The target y position, downwards from the left motor shaft
    ///
    /// # Returns:
    /// - The steps each motor has to make, as the previous belt length minus the new one
    /// - `KinematicsError::NonFinite` if a coordinate is NaN or infinite, leaving the state untouched
    /// - `KinematicsError::Unrepresentable` if the belt lengths or delta overflow a step count,
    /// leaving the state untouched
    ///
    pub fn step(&mut self, x: f64, y: f64) -> Result<StepDelta, KinematicsError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(KinematicsError::NonFinite { x, y });
        }

        let (left, right) = cartesian_to_belt(x, y, self.motor_separation as f64);
        let (Some(left), Some(right)) = (whole_steps(left), whole_steps(right)) else {
            return Err(KinematicsError::Unrepresentable { x, y });
        };
        let target = BeltState::new(left, right);

        let delta = match (self.belts.left.checked_sub(target.left), self.belts.right.checked_sub(target.right)) {
            (Some(left), Some(right)) => StepDelta::new(left, right),
            _ => return Err(KinematicsError::Unrepresentable { x, y }),
        };
        self.belts = target;

        Ok(delta)
    }

    ///
    /// Processes one path element. Points are moved to with `step`, control commands pass
    /// through as markers without touching the belts.
    ///
    pub fn process(&mut self, element: &PathElement) -> Result<OutputElement, KinematicsError> {
        match *element {
            PathElement::Point { x, y } => self.step(x, y).map(OutputElement::Steps),
            PathElement::Control(control) => Ok(OutputElement::Marker(control)),
        }
    }

    ///
    /// # Returns:
    /// - A copy of the current belt lengths
    ///
    pub fn belt_state(&self) -> BeltState {
        self.belts
    }

    pub fn motor_separation(&self) -> i64 {
        self.motor_separation
    }
}

///
/// Rounds a belt length to the nearest step.
///
/// # Returns:
/// - `None` if the length is not finite or is outside the range of an `i64`
///
fn whole_steps(length: f64) -> Option<i64> {
    let rounded = length.round();

    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}


#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::instruction::Control;

    #[test]
    fn symmetric_point_equal_belts() {
        let mut engine = KinematicsEngine::new(1000, BeltState::new(0, 0));
        let delta = engine.step(500., 800.).unwrap();

        assert_eq!(engine.belt_state(), BeltState::new(943, 943));
        assert_eq!(delta, StepDelta::new(-943, -943));
    }

    #[test]
    fn move_to_left_edge() {
        let mut engine = KinematicsEngine::new(1000, BeltState::new(943, 943));
        let delta = engine.step(0., 800.).unwrap();

        assert_eq!(engine.belt_state(), BeltState::new(800, 1281));
        assert_eq!(delta, StepDelta::new(143, -338));
    }

    #[test]
    fn repeated_point_is_zero_delta() {
        let mut engine = KinematicsEngine::new(1000, BeltState::new(943, 943));
        engine.step(312.7, 655.1).unwrap();

        assert_eq!(engine.step(312.7, 655.1).unwrap(), StepDelta::ZERO);
    }

    #[test]
    fn deltas_replay_to_engine_state() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let start = BeltState::new(47200, 47200);
        let mut engine = KinematicsEngine::new(46400, start);
        let mut replayed = start;

        for _ in 0..500 {
            let x = rng.random_range(0.0..46400.0);
            let y = rng.random_range(1.0..60000.0);

            let delta = engine.step(x, y).unwrap();
            replayed = replayed.apply(delta);
            assert_eq!(replayed, engine.belt_state());
        }
    }

    #[test]
    fn triangulation_identity() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let separation = rng.random_range(1_i64..100_000) as f64;
            let x = rng.random_range(0.0..=separation);
            let y = rng.random_range(-50_000.0..50_000.0);

            let (left, right) = cartesian_to_belt(x, y, separation);
            let lhs = left.powi(2) - right.powi(2);
            let rhs = -separation.powi(2) + 2. * separation * x;

            let scale = separation.powi(2) + y.powi(2);
            assert!((lhs - rhs).abs() <= scale * 1e-9, "{} != {}", lhs, rhs);
        }
    }

    #[test]
    fn out_of_range_point_is_not_clamped() {
        let mut engine = KinematicsEngine::new(1000, BeltState::new(943, 943));
        engine.step(-300., 400.).unwrap();

        assert_eq!(engine.belt_state(), BeltState::new(500, 1360));
    }

    #[test]
    fn non_finite_point_leaves_state() {
        let mut engine = KinematicsEngine::new(1000, BeltState::new(943, 943));

        assert!(matches!(engine.step(f64::NAN, 10.), Err(KinematicsError::NonFinite { .. })));
        assert!(engine.step(10., f64::INFINITY).is_err());
        assert_eq!(engine.belt_state(), BeltState::new(943, 943));
    }

    #[test]
    fn unrepresentable_point_leaves_state() {
        let mut engine = KinematicsEngine::new(1000, BeltState::new(943, 943));

        assert_eq!(engine.step(1e200, 1e200), Err(KinematicsError::Unrepresentable { x: 1e200, y: 1e200 }));
        assert!(matches!(engine.step(-1e19, 0.), Err(KinematicsError::Unrepresentable { .. })));
        assert_eq!(engine.belt_state(), BeltState::new(943, 943));
    }

    #[test]
    fn overflowing_delta_leaves_state() {
        let start = BeltState::new(i64::MIN + 10, 0);
        let mut engine = KinematicsEngine::new(1000, start);

        assert!(matches!(engine.step(0., 1e6), Err(KinematicsError::Unrepresentable { .. })));
        assert_eq!(engine.belt_state(), start);
    }

    #[test]
    fn large_finite_point_still_converts() {
        let mut engine = KinematicsEngine::new(1000, BeltState::new(0, 0));
        engine.step(0., 1e15).unwrap();

        assert_eq!(engine.belt_state(), BeltState::new(1_000_000_000_000_000, 1_000_000_000_000_000));
    }

    #[test]
    fn control_then_point() {
        let mut engine = KinematicsEngine::new(1000, BeltState::new(943, 943));

        let marker = engine.process(&PathElement::Control(Control::PenUp)).unwrap();
        assert_eq!(marker, OutputElement::Marker(Control::PenUp));
        assert_eq!(engine.belt_state(), BeltState::new(943, 943));

        let steps = engine.process(&PathElement::Point { x: 0., y: 800. }).unwrap();
        assert_eq!(steps, OutputElement::Steps(StepDelta::new(143, -338)));
        assert_eq!(engine.belt_state(), BeltState::new(800, 1281));
    }
}
