pub mod pipeline;
pub mod serial;

pub use pipeline::LinkPipeline;
pub use serial::{SerialLink, stop_link, READ_CHUNK};
