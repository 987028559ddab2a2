/// Errors raised by the transport and configuration layers.
///
/// Nothing in the framing path returns these: malformed input is reported
/// through `FrameEvent` and never halts the reception loop.
#[derive(Debug, thiserror::Error)]
pub enum LinkError{
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Failure reported by a command handler. Contained by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerFault{
    #[error("payload too short ({len} bytes, need {need})")]
    ShortPayload{ len: usize, need: usize },

    #[error("handler rejected command: {0}")]
    Rejected(String),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;
