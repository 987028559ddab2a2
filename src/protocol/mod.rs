//! Dabble wire protocol.
//!
//! Commands are unframed except for a start marker and a trailing terminator:
//!
//! ```text
//! [0xFF][MODULE][FUNCTION][PAYLOAD ...][0x00]
//! ```
//!
//! There is no length field; the expected total length comes from the
//! module/function table.

pub mod table;
pub mod dabble;

pub use table::{ModuleTable, ModuleDescriptor, FunctionDescriptor, Resolution};
pub use dabble::standard_table;

pub const START_MARKER: u8 = 0xFF;
pub const TERMINATOR: u8 = 0x00;

//start + module + function + terminator
pub const MIN_COMMAND_LEN: usize = 4;

//in-progress commands older than this are abandoned
pub const STALENESS_MS: u64 = 1000;

//sent once after the port opens
pub const VERSION_QUERY: &str = "AT+VERS?";
