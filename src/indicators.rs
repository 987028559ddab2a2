use std::cell::RefCell;
use std::rc::Rc;
use crate::actuator::{ActuatorSink, PinId};
use crate::events::{EventBus, ListenerId};

pub const LED1: PinId = PinId(1);
pub const LED2: PinId = PinId(2);
pub const LED3: PinId = PinId(3);

/// Gamepad button mirrored onto an indicator LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorBinding{
    pub button: &'static str,
    pub pin: PinId,
}

pub const DEFAULT_BINDINGS: [IndicatorBinding; 3] = [
    IndicatorBinding{ button: "start", pin: LED3 },
    IndicatorBinding{ button: "cross", pin: LED1 },
    IndicatorBinding{ button: "triangle", pin: LED2 },
];

/// Subscribe `-on`/`-off` listeners for each binding. Returns the
/// subscriptions so the caller can remove them again.
pub fn bind_indicators<S>(bus: &EventBus, sink: Rc<RefCell<S>>, bindings: &[IndicatorBinding]) -> Vec<(String, ListenerId)>
where
    S: ActuatorSink + 'static,
{
    let mut subscriptions = Vec::with_capacity(bindings.len() * 2);

    for binding in bindings{
        for (suffix, level) in [("on", true), ("off", false)]{
            let event = format!("gamepad-{}-{}", binding.button, suffix);
            let sink = Rc::clone(&sink);
            let pin = binding.pin;
            let id = bus.subscribe(&event, move |_, _|{
                sink.borrow_mut().write_digital(pin, level);
            });
            subscriptions.push((event, id));
        }
    }
    subscriptions
}
