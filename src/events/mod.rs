pub mod bus;
pub mod event;

pub use bus::{EventBus, Listener, ListenerId};
pub use event::{SemanticEvent, Polarity};
