use crate::hardware::math::*;
use crate::kinematics::{BeltState, StepDelta};

///
/// A structure representing the real world belts, replayed from emitted step deltas.
///
/// # Fields:
/// - `lengths`: The current belt lengths, in steps
/// - `motor_interspace`: The distance (horizontal) between the two motor shafts, in steps
///
pub struct Belts {
    lengths: BeltState,
    motor_interspace: i64,
}

impl Belts {
    ///
    /// Initialises a new belt object, by belt lengths.
    ///
    /// # Parameters:
    /// - `lengths`: The initial belt lengths, between each motor shaft and the pen
    /// - `motor_interspace`: The distance (horizontal) between the two motor shafts
    ///
    pub fn new_by_length(lengths: BeltState, motor_interspace: i64) -> Belts {
        Belts { lengths, motor_interspace }
    }

    ///
    /// Performs the movement of both belts for one step delta. A positive delta shortens a belt.
    ///
    pub fn move_by_steps(&mut self, delta: StepDelta) {
        self.lengths = self.lengths.apply(delta);
    }

    ///
    /// Gets the cartesian coordinates of the pen, given the current belt lengths. The cartesian
    /// coordinates are relative to the left motor shaft, in steps.
    ///
    /// # Returns:
    /// - The (x, y) coordinates of the current pen position, NaN if the belts cannot meet
    ///
    pub fn get_as_cartesian(&self) -> (f64, f64) {
        belt_to_cartesian(self.lengths.left as f64, self.lengths.right as f64, self.motor_interspace as f64)
    }

    pub fn get_lengths(&self) -> BeltState {
        self.lengths
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_recovers_position() {
        let mut belts = Belts::new_by_length(BeltState::new(943, 943), 1000);
        let (x, y) = belts.get_as_cartesian();
        assert!((x - 500.).abs() < 1e-9);
        assert!((y - 799.5).abs() < 0.5);

        belts.move_by_steps(StepDelta::new(143, -338));
        assert_eq!(belts.get_lengths(), BeltState::new(800, 1281));

        let (x, y) = belts.get_as_cartesian();
        assert!(x.abs() < 1.);
        assert!((y - 800.).abs() < 1.);
    }
}
