pub mod actuator;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod ffi;
pub mod framing;
pub mod gamepad;
pub mod indicators;
pub mod link;
pub mod protocol;
pub mod ramp;
pub mod steering;

#[cfg(feature = "python")]
pub mod python;

pub use actuator::{ActuatorSink, Output, PinId, RecordingSink, TracingSink};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::LinkConfig;
pub use error::{HandlerFault, LinkError, Result};
pub use events::{EventBus, ListenerId, Polarity, SemanticEvent};
pub use framing::{
    CommandBuffer, CommandHandler, DispatchOutcome, Dispatcher,
    FnHandler, FrameAssembler, FrameEvent, FrameStats,
};
pub use gamepad::{GamepadHandler, GamepadReport};
pub use link::{LinkPipeline, SerialLink};
pub use protocol::{standard_table, FunctionDescriptor, ModuleDescriptor, ModuleTable, Resolution};
pub use ramp::{MotorController, MotorCurve, RampPhase, ServoController, ServoOptions};
pub use steering::{Steering, SteeringOptions};
