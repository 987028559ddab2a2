//! Gamepad payload decoding.
//!
//! Byte 5 carries the action buttons as a bitmask. Byte 6 is the direction
//! pad in digital mode (bit 0 of the function byte set); in analog and
//! accelerometer modes it packs a stick angle and radius, which is not
//! decoded here.

use crate::error::HandlerFault;
use crate::events::{EventBus, Polarity, SemanticEvent};
use crate::framing::CommandHandler;

pub const SOURCE: &str = "gamepad";

const BUTTON_BYTE: usize = 5;
const STICK_BYTE: usize = 6;

pub const BUTTONS: [(u8, &str); 6] = [
    (0x01, "start"),
    (0x02, "select"),
    (0x04, "triangle"),
    (0x08, "circle"),
    (0x10, "cross"),
    (0x20, "square"),
];

pub const DIRECTIONS: [(u8, &str); 4] = [
    (0x01, "up"),
    (0x02, "down"),
    (0x04, "left"),
    (0x08, "right"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode{
    Digital,
    Analog,
}

impl PadMode{
    pub fn from_function(function: u8) -> Self{
        if function & 0x01 != 0 { PadMode::Digital } else { PadMode::Analog }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stick{
    Dpad(u8),
    /// Packed angle/radius byte, left undecoded.
    Unsupported(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamepadReport{
    pub mode: PadMode,
    pub buttons: u8,
    pub stick: Stick,
}

impl GamepadReport{
    pub fn parse(bytes: &[u8]) -> Result<Self, HandlerFault>{
        if bytes.len() <= STICK_BYTE{
            return Err(HandlerFault::ShortPayload{ len: bytes.len(), need: STICK_BYTE + 1 });
        }

        let mode = PadMode::from_function(bytes[2]);
        let raw = bytes[STICK_BYTE];
        let stick = match mode{
            PadMode::Digital => Stick::Dpad(raw),
            PadMode::Analog => Stick::Unsupported(raw),
        };

        Ok(GamepadReport{ mode, buttons: bytes[BUTTON_BYTE], stick })
    }

    /// One on/off event per button, then per direction in digital mode.
    pub fn events(&self) -> Vec<SemanticEvent>{
        let mut events: Vec<SemanticEvent> = BUTTONS.iter()
            .map(|&(bit, name)| SemanticEvent::new(SOURCE, name, Polarity::from_bit(self.buttons & bit != 0)))
            .collect();

        if let Stick::Dpad(dpad) = self.stick{
            events.extend(DIRECTIONS.iter()
                .map(|&(bit, name)| SemanticEvent::new(SOURCE, name, Polarity::from_bit(dpad & bit != 0))));
        }
        events
    }
}

/// Publishes the decoded gamepad state on the bus.
pub struct GamepadHandler;

impl CommandHandler for GamepadHandler{
    fn handle(&self, bytes: &[u8], bus: &EventBus) -> Result<(), HandlerFault>{
        let report = GamepadReport::parse(bytes)?;
        tracing::debug!(?report, "gamepad");

        if let Stick::Unsupported(raw) = report.stick{
            tracing::trace!(raw, "analog stick payload not decoded");
        }

        for event in report.events(){
            bus.publish(&event.name());
        }
        Ok(())
    }
}
