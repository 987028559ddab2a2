//! Output side of the controllers. The hardware layer implements
//! [`ActuatorSink`]; [`RecordingSink`] logs writes for tests and dry runs.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u8);

pub trait ActuatorSink{
    //duty in 0.0..=1.0
    fn write_duty(&mut self, pin: PinId, duty: f32);

    fn write_pulse(&mut self, pin: PinId, level: bool, width_ms: f32);

    fn write_digital(&mut self, pin: PinId, level: bool);
}

//lets several controllers drive one board
impl<S: ActuatorSink + ?Sized> ActuatorSink for Rc<RefCell<S>>{
    fn write_duty(&mut self, pin: PinId, duty: f32){
        self.borrow_mut().write_duty(pin, duty);
    }

    fn write_pulse(&mut self, pin: PinId, level: bool, width_ms: f32){
        self.borrow_mut().write_pulse(pin, level, width_ms);
    }

    fn write_digital(&mut self, pin: PinId, level: bool){
        self.borrow_mut().write_digital(pin, level);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Output{
    Duty{ pin: PinId, duty: f32 },
    Pulse{ pin: PinId, level: bool, width_ms: f32 },
    Digital{ pin: PinId, level: bool },
}

impl Output{
    pub fn pin(&self) -> PinId{
        match *self{
            Output::Duty{ pin, .. } | Output::Pulse{ pin, .. } | Output::Digital{ pin, .. } => pin,
        }
    }
}

/// Sink that records every write. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink{
    log: Rc<RefCell<Vec<Output>>>,
}

impl RecordingSink{
    pub fn new() -> Self{
        Self::default()
    }

    pub fn writes(&self) -> Vec<Output>{
        self.log.borrow().clone()
    }

    pub fn writes_to(&self, pin: PinId) -> Vec<Output>{
        self.log.borrow().iter().filter(|w| w.pin() == pin).copied().collect()
    }

    pub fn last_duty(&self, pin: PinId) -> Option<f32>{
        self.log.borrow().iter().rev().find_map(|w| match *w{
            Output::Duty{ pin: p, duty } if p == pin => Some(duty),
            _ => None,
        })
    }

    pub fn last_digital(&self, pin: PinId) -> Option<bool>{
        self.log.borrow().iter().rev().find_map(|w| match *w{
            Output::Digital{ pin: p, level } if p == pin => Some(level),
            _ => None,
        })
    }

    pub fn clear(&self){
        self.log.borrow_mut().clear();
    }

    pub fn len(&self) -> usize{
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool{
        self.log.borrow().is_empty()
    }
}

impl ActuatorSink for RecordingSink{
    fn write_duty(&mut self, pin: PinId, duty: f32){
        self.log.borrow_mut().push(Output::Duty{ pin, duty });
    }

    fn write_pulse(&mut self, pin: PinId, level: bool, width_ms: f32){
        self.log.borrow_mut().push(Output::Pulse{ pin, level, width_ms });
    }

    fn write_digital(&mut self, pin: PinId, level: bool){
        self.log.borrow_mut().push(Output::Digital{ pin, level });
    }
}

/// Sink that only logs through `tracing`, for running without hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ActuatorSink for TracingSink{
    fn write_duty(&mut self, pin: PinId, duty: f32){
        tracing::debug!(pin = pin.0, duty, "duty");
    }

    fn write_pulse(&mut self, pin: PinId, level: bool, width_ms: f32){
        tracing::trace!(pin = pin.0, level, width_ms, "pulse");
    }

    fn write_digital(&mut self, pin: PinId, level: bool){
        tracing::info!(pin = pin.0, level, "digital");
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_recording_sink_shared_log(){
        let sink = RecordingSink::new();
        let mut writer = sink.clone();
        writer.write_duty(PinId(6), 0.5);
        writer.write_digital(PinId(1), true);
        writer.write_duty(PinId(6), 0.25);

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.last_duty(PinId(6)), Some(0.25));
        assert_eq!(sink.last_digital(PinId(1)), Some(true));
        assert_eq!(sink.writes_to(PinId(6)).len(), 2);
        assert_eq!(sink.last_duty(PinId(7)), None);
    }

    #[test]
    fn test_shared_sink_through_refcell(){
        let sink = RecordingSink::new();
        let mut shared = Rc::new(RefCell::new(sink.clone()));
        shared.write_pulse(PinId(8), true, 1.5);
        assert_eq!(sink.writes(), vec![Output::Pulse{ pin: PinId(8), level: true, width_ms: 1.5 }]);
    }
}
