use std::cell::RefCell;
use crate::actuator::{ActuatorSink, PinId};
use crate::clock::Clock;
use super::state::{RampPhase, RampState};
use super::timer::RepeatingTimer;

pub const SERVO_TICK_MS: u64 = 20;
pub const DEFAULT_MOVE_MS: u64 = 1000;

pub type Completion = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoOptions{
    /// Span of the pulse width in ms; pulses are centred on 1.5 ms.
    pub range: f32,
    pub initial_position: Option<f32>,
}

impl Default for ServoOptions{
    fn default() -> Self{
        ServoOptions{ range: 1.0, initial_position: None }
    }
}

/// Servo position tween. Position is 0.0..=1.0, written as one pulse per
/// 20 ms tick while a move is in flight.
pub struct ServoController<S: ActuatorSink, C: Clock>{
    pin: PinId,
    sink: S,
    clock: C,
    offset: f32,
    range: f32,
    position: Option<f32>,
    phase: RampPhase,
    ramp: Option<RampState>,
    timer: RepeatingTimer,
    on_complete: Option<Completion>,
}

impl<S: ActuatorSink, C: Clock> ServoController<S, C>{
    pub fn new(pin: PinId, sink: S, clock: C, options: ServoOptions) -> Self{
        ServoController{
            pin,
            sink,
            clock,
            offset: 1.5 - options.range / 2.0,
            range: options.range,
            position: options.initial_position,
            phase: RampPhase::Idle,
            ramp: None,
            timer: RepeatingTimer::new(SERVO_TICK_MS),
            on_complete: None,
        }
    }

    pub fn move_to(&mut self, target: f32, duration_ms: u64){
        self.start(target, duration_ms, None);
    }

    pub fn move_default(&mut self, target: f32){
        self.start(target, DEFAULT_MOVE_MS, None);
    }

    /// Like [`move_to`](Self::move_to), calling `on_complete` once when the
    /// servo reaches `target`. Not called if the move is stopped or replaced.
    pub fn move_then<F>(&mut self, target: f32, duration_ms: u64, on_complete: F)
    where
        F: FnOnce() + 'static,
    {
        self.start(target, duration_ms, Some(Box::new(on_complete)));
    }

    fn start(&mut self, target: f32, duration_ms: u64, on_complete: Option<Completion>){
        self.timer.cancel();

        //unknown position: assume we are already there
        let initial = *self.position.get_or_insert(target);

        tracing::debug!(pin = self.pin.0, initial, target, duration_ms, "servo move");
        self.ramp = Some(RampState::new(initial, target, SERVO_TICK_MS, duration_ms));
        self.on_complete = on_complete;
        self.phase = RampPhase::Ramping;
        self.timer.start(self.clock.now_ms());
    }

    pub fn stop(&mut self){
        self.timer.cancel();
        self.ramp = None;
        self.on_complete = None;
        self.phase = RampPhase::Stopped;
        tracing::debug!(pin = self.pin.0, position = ?self.position, "servo stop");
    }

    pub fn poll(&mut self) -> usize{
        let (ticks, done) = self.advance();
        if let Some(done) = done{
            done();
        }
        ticks
    }

    /// [`poll`](Self::poll) for a controller behind a `RefCell`. The borrow is
    /// released before the completion callback runs, so the callback may
    /// start the next move through the same handle.
    pub fn poll_shared(this: &RefCell<Self>) -> usize{
        let (ticks, done) = this.borrow_mut().advance();
        if let Some(done) = done{
            done();
        }
        ticks
    }

    fn advance(&mut self) -> (usize, Option<Completion>){
        let now = self.clock.now_ms();
        let mut ticks = 0;
        let mut done = None;
        while self.timer.take_due(now){
            if let Some(callback) = self.tick(){
                done = Some(callback);
            }
            ticks += 1;
        }
        (ticks, done)
    }

    fn tick(&mut self) -> Option<Completion>{
        let Some(ramp) = self.ramp.as_mut() else{
            self.timer.cancel();
            return None;
        };

        let step = ramp.step();
        self.position = Some(step.value);
        let width = self.pulse_width(step.value);
        self.sink.write_pulse(self.pin, true, width);

        if step.finished{
            self.timer.cancel();
            self.ramp = None;
            self.phase = RampPhase::Idle;
            return self.on_complete.take();
        }
        None
    }

    pub fn pulse_width(&self, position: f32) -> f32{
        self.offset + position.clamp(0.0, 1.0) * self.range
    }

    pub fn position(&self) -> Option<f32>{
        self.position
    }

    pub fn phase(&self) -> RampPhase{
        self.phase
    }

    pub fn ramp(&self) -> Option<&RampState>{
        self.ramp.as_ref()
    }

    pub fn timer_active(&self) -> bool{
        self.timer.is_active()
    }

}
