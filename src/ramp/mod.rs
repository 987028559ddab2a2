//! Timer-driven output ramps.
//!
//! Controllers own their [`RepeatingTimer`]; the run loop calls `poll()` on
//! each controller, which runs the ticks that have come due. Starting a new
//! ramp or stopping always cancels the controller's timer first, so each
//! controller has at most one ramp in flight.

pub mod timer;
pub mod state;
pub mod servo;
pub mod motor;

pub use timer::RepeatingTimer;
pub use state::{RampPhase, RampState, RampStep};
pub use servo::{ServoController, ServoOptions, SERVO_TICK_MS, DEFAULT_MOVE_MS};
pub use motor::{MotorController, MotorCurve, Direction, Orientation, Wheel, MAX_SPEED};
