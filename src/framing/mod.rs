pub mod assembler;
pub mod dispatch;

pub use assembler::{FrameAssembler, FrameEvent, FrameStats, CommandBuffer};
pub use dispatch::{Dispatcher, DispatchOutcome, DispatchStats, CommandHandler, FnHandler, NoopHandler};
