use std::path::Path;
use serde::Deserialize;
use crate::actuator::PinId;
use crate::error::Result;
use crate::protocol::STALENESS_MS;
use crate::ramp::{Orientation, ServoOptions, Wheel};
use crate::steering::SteeringOptions;

pub const DEFAULT_PORT: &str = "/dev/ttyACM0";
pub const DEFAULT_BAUD: u32 = 9600;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServoConfig{
    pub pin: u8,
    pub range: f32,
    pub initial_position: Option<f32>,
    pub swing_ms: u64,
}

impl Default for ServoConfig{
    fn default() -> Self{
        ServoConfig{ pin: 8, range: 2.0, initial_position: Some(0.5), swing_ms: 2000 }
    }
}

impl ServoConfig{
    pub fn options(&self) -> ServoOptions{
        ServoOptions{ range: self.range, initial_position: self.initial_position }
    }

    pub fn steering(&self) -> SteeringOptions{
        SteeringOptions{ swing_ms: self.swing_ms, ..SteeringOptions::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotorConfig{
    pub left_forward: u8,
    pub left_reverse: u8,
    pub right_forward: u8,
    pub right_reverse: u8,
    //right motor mounted mirrored
    pub right_inverted: bool,
}

impl Default for MotorConfig{
    fn default() -> Self{
        MotorConfig{
            left_forward: 6,
            left_reverse: 7,
            right_forward: 8,
            right_reverse: 9,
            right_inverted: true,
        }
    }
}

impl MotorConfig{
    pub fn wheels(&self) -> (Wheel, Wheel){
        let right_orientation = if self.right_inverted { Orientation::Inverted } else { Orientation::Normal };
        (
            Wheel::new(PinId(self.left_forward), PinId(self.left_reverse), Orientation::Normal),
            Wheel::new(PinId(self.right_forward), PinId(self.right_reverse), right_orientation),
        )
    }
}

/// Runtime settings for the bridge. Every field has a default, so a TOML
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkConfig{
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub staleness_ms: u64,
    pub indicators: bool,
    pub servo: ServoConfig,
    pub motor: MotorConfig,
}

impl Default for LinkConfig{
    fn default() -> Self{
        LinkConfig{
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD,
            read_timeout_ms: 10,
            staleness_ms: STALENESS_MS,
            indicators: true,
            servo: ServoConfig::default(),
            motor: MotorConfig::default(),
        }
    }
}

impl LinkConfig{
    pub fn from_toml_str(text: &str) -> Result<Self>{
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self>{
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_port(mut self, port: &str) -> Self{
        self.port = port.to_string();
        self
    }

    pub fn with_baud(mut self, baud: u32) -> Self{
        self.baud_rate = baud;
        self
    }
}
