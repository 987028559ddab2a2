use std::sync::Arc;
use crate::framing::NoopHandler;
use crate::gamepad::GamepadHandler;
use super::table::{ModuleTable, ModuleDescriptor, FunctionDescriptor};

pub const MODULE_DABBLE: u8 = 0x00;
pub const MODULE_GAMEPAD: u8 = 0x01;
pub const MODULE_SENSORS: u8 = 0x04;
pub const MODULE_MOTOR_CONTROLS: u8 = 0x05;

pub const GAMEPAD_DIGITAL: u8 = 0x01;
pub const GAMEPAD_ANALOG: u8 = 0x02;
pub const GAMEPAD_ACCL: u8 = 0x03;

/// Module table for the Dabble app traffic seen on the link.
///
/// Only the gamepad functions decode their payload; the rest are listed so
/// their commands frame correctly.
pub fn standard_table() -> ModuleTable{
    let gamepad: Arc<GamepadHandler> = Arc::new(GamepadHandler);

    ModuleTable::new()
        .module(ModuleDescriptor::new(MODULE_DABBLE, "dabble", 8)
            .function(FunctionDescriptor::new(0x01, "connection"))
            .function(FunctionDescriptor::new(0x02, "change input mode")
                .with_handler(Arc::new(NoopHandler))))
        .module(ModuleDescriptor::new(MODULE_GAMEPAD, "gamepad", 8)
            .function(FunctionDescriptor::new(GAMEPAD_DIGITAL, "digital").with_handler(gamepad.clone()))
            .function(FunctionDescriptor::new(GAMEPAD_ANALOG, "analog").with_handler(gamepad.clone()))
            .function(FunctionDescriptor::new(GAMEPAD_ACCL, "accl").with_handler(gamepad)))
        .module(ModuleDescriptor::new(MODULE_SENSORS, "sensors", 10)
            .function(FunctionDescriptor::new(0x01, "accelerometer").with_length(20))
            .function(FunctionDescriptor::new(0x02, "gyroscope").with_length(20))
            .function(FunctionDescriptor::new(0x03, "magnetometer").with_length(20))
            .function(FunctionDescriptor::new(0x04, "proximity").with_length(10))
            .function(FunctionDescriptor::new(0x05, "light").with_length(10))
            .function(FunctionDescriptor::new(0x06, "sound"))
            .function(FunctionDescriptor::new(0x07, "temperature"))
            .function(FunctionDescriptor::new(0x08, "barometer"))
            .function(FunctionDescriptor::new(0x09, "gps").with_length(15))
            .function(FunctionDescriptor::new(0x0A, "speed")))
        .module(ModuleDescriptor::new(MODULE_MOTOR_CONTROLS, "motor controls", 7)
            .function(FunctionDescriptor::new(0x01, "motor1").with_length(8))
            .function(FunctionDescriptor::new(0x02, "motor2").with_length(8))
            .function(FunctionDescriptor::new(0x03, "servo1").with_length(7))
            .function(FunctionDescriptor::new(0x04, "servo2").with_length(7)))
}
