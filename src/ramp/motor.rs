//! Two-wheel drive with speed ramps.
//!
//! Each wheel has two drive lines; one carries the duty cycle and the other
//! is held at zero. Which line is "forward" depends on how the motor is
//! mounted, so each wheel carries an [`Orientation`].

use std::cell::RefCell;
use crate::actuator::{ActuatorSink, PinId};
use crate::clock::Clock;
use super::servo::Completion;
use super::state::{RampPhase, RampState};
use super::timer::RepeatingTimer;

pub const MAX_SPEED: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction{
    Forward,
    Reverse,
}

impl Direction{
    pub fn sign(&self) -> f32{
        match self{
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation{
    Normal,
    Inverted,
}

impl Orientation{
    pub fn multiplier(&self) -> f32{
        match self{
            Orientation::Normal => 1.0,
            Orientation::Inverted => -1.0,
        }
    }
}

/// Tick period of a speed ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCurve{
    Quick,
    Smooth,
    Gentle,
}

impl MotorCurve{
    pub fn period_ms(&self) -> u64{
        match self{
            MotorCurve::Quick => 66,
            MotorCurve::Smooth => 150,
            MotorCurve::Gentle => 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wheel{
    pub forward_pin: PinId,
    pub reverse_pin: PinId,
    pub orientation: Orientation,
}

impl Wheel{
    pub fn new(forward_pin: PinId, reverse_pin: PinId, orientation: Orientation) -> Self{
        Wheel{ forward_pin, reverse_pin, orientation }
    }

    fn drive<S: ActuatorSink>(&self, sink: &mut S, velocity: f32){
        let duty = (velocity.abs() / MAX_SPEED).clamp(0.0, 1.0);
        let (driven, idle) = if velocity * self.orientation.multiplier() >= 0.0{
            (self.forward_pin, self.reverse_pin)
        }else{
            (self.reverse_pin, self.forward_pin)
        };
        //release the opposing line before driving
        sink.write_duty(idle, 0.0);
        sink.write_duty(driven, duty);
    }
}

/// Speed controller for a left/right wheel pair. Velocity is a signed
/// percentage, positive forward.
pub struct MotorController<S: ActuatorSink, C: Clock>{
    left: Wheel,
    right: Wheel,
    sink: S,
    clock: C,
    velocity: f32,
    phase: RampPhase,
    ramp: Option<RampState>,
    timer: RepeatingTimer,
    on_complete: Option<Completion>,
}

impl<S: ActuatorSink, C: Clock> MotorController<S, C>{
    pub fn new(left: Wheel, right: Wheel, sink: S, clock: C) -> Self{
        MotorController{
            left,
            right,
            sink,
            clock,
            velocity: 0.0,
            phase: RampPhase::Idle,
            ramp: None,
            timer: RepeatingTimer::new(MotorCurve::Quick.period_ms()),
            on_complete: None,
        }
    }

    /// Write `speed` (0..=100, clamped) in `direction` right away, cancelling
    /// any ramp in flight.
    pub fn set_speed(&mut self, speed: f32, direction: Direction){
        self.cancel_ramp();
        self.phase = RampPhase::Idle;
        self.apply(signed(speed, direction));
    }

    pub fn ramp_to(&mut self, speed: f32, direction: Direction, duration_ms: u64, curve: MotorCurve){
        self.start(signed(speed, direction), duration_ms, curve, None);
    }

    pub fn ramp_then<F>(&mut self, speed: f32, direction: Direction, duration_ms: u64, curve: MotorCurve, on_complete: F)
    where
        F: FnOnce() + 'static,
    {
        self.start(signed(speed, direction), duration_ms, curve, Some(Box::new(on_complete)));
    }

    fn start(&mut self, target: f32, duration_ms: u64, curve: MotorCurve, on_complete: Option<Completion>){
        self.cancel_ramp();

        tracing::debug!(from = self.velocity, to = target, duration_ms, ?curve, "motor ramp");
        self.timer.set_period(curve.period_ms());
        self.ramp = Some(RampState::new(self.velocity, target, curve.period_ms(), duration_ms));
        self.on_complete = on_complete;
        self.phase = RampPhase::Ramping;
        self.timer.start(self.clock.now_ms());
    }

    /// Abandon the ramp in flight. Outputs keep their last value.
    pub fn stop(&mut self){
        self.cancel_ramp();
        self.phase = RampPhase::Stopped;
    }

    /// Stop and cut both wheels.
    pub fn halt(&mut self){
        self.stop();
        self.apply(0.0);
    }

    pub fn poll(&mut self) -> usize{
        let (ticks, done) = self.advance();
        if let Some(done) = done{
            done();
        }
        ticks
    }

    //callback runs after the borrow is released
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
        self.apply(step.value);

        if step.finished{
            self.timer.cancel();
            self.ramp = None;
            self.phase = RampPhase::Idle;
            return self.on_complete.take();
        }
        None
    }

    fn cancel_ramp(&mut self){
        self.timer.cancel();
        self.ramp = None;
        self.on_complete = None;
    }

    fn apply(&mut self, velocity: f32){
        self.velocity = velocity.clamp(-MAX_SPEED, MAX_SPEED);
        self.left.drive(&mut self.sink, self.velocity);
        self.right.drive(&mut self.sink, self.velocity);
    }

    pub fn speed(&self) -> f32{
        self.velocity.abs()
    }

    pub fn direction(&self) -> Direction{
        if self.velocity < 0.0 { Direction::Reverse } else { Direction::Forward }
    }

    pub fn velocity(&self) -> f32{
        self.velocity
    }

    pub fn phase(&self) -> RampPhase{
        self.phase
    }

    pub fn timer_active(&self) -> bool{
        self.timer.is_active()
    }
}

fn signed(speed: f32, direction: Direction) -> f32{
    speed.clamp(0.0, MAX_SPEED) * direction.sign()
}

#[cfg(test)]
mod tests{
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use crate::actuator::RecordingSink;
    use crate::clock::ManualClock;

    const LEFT_A: PinId = PinId(6);
    const LEFT_B: PinId = PinId(7);
    const RIGHT_A: PinId = PinId(8);
    const RIGHT_B: PinId = PinId(9);

    fn motors() -> (MotorController<RecordingSink, ManualClock>, RecordingSink, ManualClock){
        let sink = RecordingSink::new();
        let clock = ManualClock::new(0);
        let controller = MotorController::new(
            Wheel::new(LEFT_A, LEFT_B, Orientation::Normal),
            Wheel::new(RIGHT_A, RIGHT_B, Orientation::Inverted),
            sink.clone(),
            clock.clone(),
        );
        (controller, sink, clock)
    }

    #[test]
    fn test_set_speed_forward_drives_opposite_lines(){
        let (mut motors, sink, _) = motors();
        motors.set_speed(50.0, Direction::Forward);

        assert_eq!(sink.last_duty(LEFT_A), Some(0.5));
        assert_eq!(sink.last_duty(LEFT_B), Some(0.0));
        //right wheel is mounted mirrored
        assert_eq!(sink.last_duty(RIGHT_A), Some(0.0));
        assert_eq!(sink.last_duty(RIGHT_B), Some(0.5));
    }

    #[test]
    fn test_set_speed_reverse(){
        let (mut motors, sink, _) = motors();
        motors.set_speed(25.0, Direction::Reverse);

        assert_eq!(sink.last_duty(LEFT_A), Some(0.0));
        assert_eq!(sink.last_duty(LEFT_B), Some(0.25));
        assert_eq!(sink.last_duty(RIGHT_A), Some(0.25));
        assert_eq!(sink.last_duty(RIGHT_B), Some(0.0));
        assert_eq!(motors.direction(), Direction::Reverse);
        assert_eq!(motors.speed(), 25.0);
    }

    #[test]
    fn test_set_speed_clamped(){
        let (mut motors, sink, _) = motors();
        motors.set_speed(250.0, Direction::Forward);
        assert_eq!(sink.last_duty(LEFT_A), Some(1.0));
        motors.set_speed(-5.0, Direction::Forward);
        assert_eq!(sink.last_duty(LEFT_A), Some(0.0));
        assert_eq!(motors.speed(), 0.0);
    }

    #[test]
    fn test_idle_line_written_first(){
        let (mut motors, sink, _) = motors();
        motors.set_speed(70.0, Direction::Forward);
        let writes = sink.writes();
        assert_eq!(writes[0].pin(), LEFT_B);
        assert_eq!(writes[1].pin(), LEFT_A);
    }

    #[test]
    fn test_ramp_uses_curve_period(){
        let (mut motors, sink, clock) = motors();
        motors.ramp_to(100.0, Direction::Forward, 660, MotorCurve::Quick);
        clock.advance(65);
        assert_eq!(motors.poll(), 0);
        clock.advance(1);
        assert_eq!(motors.poll(), 1);
        assert_eq!(sink.len(), 4);

        clock.advance(2000);
        motors.poll();
        assert_eq!(motors.velocity(), 100.0);
        assert_eq!(motors.phase(), RampPhase::Idle);
    }

    #[test]
    fn test_ramp_through_zero_is_monotonic(){
        let (mut motors, _, clock) = motors();
        motors.set_speed(60.0, Direction::Forward);
        let done = Rc::new(Cell::new(0));
        let done_ref = Rc::clone(&done);
        motors.ramp_then(60.0, Direction::Reverse, 1000, MotorCurve::Gentle, move || done_ref.set(done_ref.get() + 1));

        let mut seen = vec![motors.velocity()];
        for _ in 0..20{
            clock.advance(200);
            motors.poll();
            seen.push(motors.velocity());
        }
        assert!(seen.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(motors.velocity(), -60.0);
        assert_eq!(motors.direction(), Direction::Reverse);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn test_stop_keeps_output_and_halt_cuts_it(){
        let (mut motors, sink, clock) = motors();
        motors.ramp_to(80.0, Direction::Forward, 1500, MotorCurve::Smooth);
        clock.advance(450);
        motors.poll();
        let velocity = motors.velocity();
        assert!(velocity > 0.0 && velocity < 80.0);

        motors.stop();
        assert_eq!(motors.phase(), RampPhase::Stopped);
        assert!(!motors.timer_active());
        clock.advance(3000);
        assert_eq!(motors.poll(), 0);
        assert_eq!(motors.velocity(), velocity);

        motors.halt();
        assert_eq!(sink.last_duty(LEFT_A), Some(0.0));
        assert_eq!(sink.last_duty(RIGHT_B), Some(0.0));
        assert_eq!(motors.speed(), 0.0);
    }

    #[test]
    fn test_set_speed_cancels_ramp(){
        let (mut motors, _, clock) = motors();
        motors.ramp_to(100.0, Direction::Forward, 1000, MotorCurve::Quick);
        motors.set_speed(10.0, Direction::Forward);
        clock.advance(2000);
        assert_eq!(motors.poll(), 0);
        assert_eq!(motors.speed(), 10.0);
    }

    #[test]
    fn test_completion_can_chain_next_ramp(){
        let (motors, sink, clock) = motors();
        let motors = Rc::new(RefCell::new(motors));
        let again = Rc::clone(&motors);
        motors.borrow_mut().ramp_then(40.0, Direction::Forward, 300, MotorCurve::Smooth, move ||{
            again.borrow_mut().ramp_to(0.0, Direction::Forward, 300, MotorCurve::Smooth);
        });

        clock.advance(1000);
        MotorController::poll_shared(&motors);
        assert_eq!(motors.borrow().velocity(), 40.0);
        assert_eq!(motors.borrow().phase(), RampPhase::Ramping);

        clock.advance(1000);
        MotorController::poll_shared(&motors);
        assert_eq!(motors.borrow().velocity(), 0.0);
        assert_eq!(motors.borrow().phase(), RampPhase::Idle);
        assert_eq!(sink.last_duty(LEFT_A), Some(0.0));
    }
}
