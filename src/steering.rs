//! Directional pad → servo.
//!
//! Holding left swings the servo towards 0.0, holding right towards 1.0.
//! Releasing the held direction stops the servo where it is; pressing the
//! other direction turns around. The gamepad re-sends its state with every
//! packet, so a repeated press of the held direction is a no-op.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use crate::actuator::ActuatorSink;
use crate::clock::Clock;
use crate::events::{EventBus, ListenerId};
use crate::ramp::ServoController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerState{
    Idle,
    MovingLeft,
    MovingRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerInput{
    LeftPressed,
    LeftReleased,
    RightPressed,
    RightReleased,
}

impl SteerInput{
    pub const EVENTS: [(&'static str, SteerInput); 4] = [
        ("gamepad-left-on", SteerInput::LeftPressed),
        ("gamepad-left-off", SteerInput::LeftReleased),
        ("gamepad-right-on", SteerInput::RightPressed),
        ("gamepad-right-off", SteerInput::RightReleased),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteerAction{
    Hold,
    SwingLeft,
    SwingRight,
    Stop,
}

pub fn transition(state: SteerState, input: SteerInput) -> (SteerState, SteerAction){
    use SteerAction::*;
    use SteerInput::*;
    use SteerState::*;

    match (state, input){
        (MovingLeft, LeftPressed) => (MovingLeft, Hold),
        (MovingRight, RightPressed) => (MovingRight, Hold),
        (_, LeftPressed) => (MovingLeft, SwingLeft),
        (_, RightPressed) => (MovingRight, SwingRight),
        (MovingLeft, LeftReleased) => (Idle, Stop),
        (MovingRight, RightReleased) => (Idle, Stop),
        (s, LeftReleased) | (s, RightReleased) => (s, Hold),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringOptions{
    pub left_position: f32,
    pub right_position: f32,
    pub swing_ms: u64,
}

impl Default for SteeringOptions{
    fn default() -> Self{
        SteeringOptions{ left_position: 0.0, right_position: 1.0, swing_ms: 2000 }
    }
}

pub struct Steering<S: ActuatorSink, C: Clock>{
    servo: Rc<RefCell<ServoController<S, C>>>,
    options: SteeringOptions,
    state: Cell<SteerState>,
    subscriptions: RefCell<Vec<(&'static str, ListenerId)>>,
}

impl<S: ActuatorSink + 'static, C: Clock + 'static> Steering<S, C>{
    pub fn new(servo: Rc<RefCell<ServoController<S, C>>>, options: SteeringOptions) -> Rc<Self>{
        Rc::new(Steering{
            servo,
            options,
            state: Cell::new(SteerState::Idle),
            subscriptions: RefCell::new(Vec::new()),
        })
    }

    /// Subscribe to the four direction events on `bus`.
    pub fn attach(self: &Rc<Self>, bus: &EventBus){
        for (event, input) in SteerInput::EVENTS{
            let steering = Rc::clone(self);
            let id = bus.subscribe(event, move |_, _|{
                steering.handle(input);
            });
            self.subscriptions.borrow_mut().push((event, id));
        }
    }

    pub fn detach(&self, bus: &EventBus){
        for (event, id) in self.subscriptions.borrow_mut().drain(..){
            bus.unsubscribe(event, id);
        }
    }

    pub fn handle(&self, input: SteerInput) -> SteerAction{
        let (next, action) = transition(self.state.get(), input);
        if next != self.state.get(){
            tracing::debug!(from = ?self.state.get(), to = ?next, ?input, "steering");
        }
        self.state.set(next);

        match action{
            SteerAction::Hold => {}
            SteerAction::SwingLeft => self.servo.borrow_mut().move_to(self.options.left_position, self.options.swing_ms),
            SteerAction::SwingRight => self.servo.borrow_mut().move_to(self.options.right_position, self.options.swing_ms),
            SteerAction::Stop => self.servo.borrow_mut().stop(),
        }
        action
    }

    pub fn state(&self) -> SteerState{
        self.state.get()
    }
}
