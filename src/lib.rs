//!
//! Converts drawing paths into stepper motor steps for a two-belt hanging plotter
//!

pub mod convert;
pub mod hardware;
pub mod instruction;
pub mod kinematics;
pub mod preview;
