use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Listener callback. Receives the bus so it can (un)subscribe during delivery.
pub type Listener = Rc<dyn Fn(&EventBus, &str)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Synchronous publish/subscribe keyed by event name.
///
/// `publish` runs every listener on the caller's turn, in subscription
/// order. The listener list is snapshotted before delivery: listeners added
/// or removed while an event is being delivered take effect from the next
/// `publish`.
pub struct EventBus{
    listeners: RefCell<HashMap<String, Vec<(ListenerId, Listener)>>>,
    next_id: Cell<u64>,
    published: Cell<u64>,
}

impl EventBus{
    pub fn new() -> Self{
        EventBus{
            listeners: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            published: Cell::new(0),
        }
    }

    pub fn subscribe<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&EventBus, &str) + 'static,
    {
        self.subscribe_rc(event, Rc::new(listener))
    }

    pub fn subscribe_rc(&self, event: &str, listener: Listener) -> ListenerId{
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.listeners.borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    //returns false when the listener was not subscribed to this event
    pub fn unsubscribe(&self, event: &str, id: ListenerId) -> bool{
        let mut listeners = self.listeners.borrow_mut();
        let Some(list) = listeners.get_mut(event) else{
            return false;
        };

        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        let removed = list.len() != before;

        if list.is_empty(){
            listeners.remove(event);
        }
        removed
    }

    /// Deliver `event` to its listeners. Returns how many were called.
    pub fn publish(&self, event: &str) -> usize{
        self.published.set(self.published.get() + 1);

        let snapshot: Vec<Listener> = match self.listeners.borrow().get(event){
            Some(list) => list.iter().map(|(_, l)| Rc::clone(l)).collect(),
            None => return 0,
        };

        tracing::trace!(event, listeners = snapshot.len(), "publish");

        for listener in &snapshot{
            listener(self, event);
        }
        snapshot.len()
    }

    pub fn listener_count(&self, event: &str) -> usize{
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }

    pub fn published_count(&self) -> u64{
        self.published.get()
    }
}

impl Default for EventBus{
    fn default() -> Self{
        Self::new()
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Listener){
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_ref = Rc::clone(&log);
        let make = move |tag: &str|{
            let log = Rc::clone(&log_ref);
            let tag = tag.to_string();
            Rc::new(move |_: &EventBus, event: &str|{
                log.borrow_mut().push(format!("{}:{}", tag, event));
            }) as Listener
        };
        (log, make)
    }

    #[test]
    fn test_publish_in_subscription_order(){
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe_rc("gamepad-cross-on", make("a"));
        bus.subscribe_rc("gamepad-cross-on", make("b"));
        bus.subscribe_rc("gamepad-cross-off", make("c"));

        assert_eq!(bus.publish("gamepad-cross-on"), 2);
        assert_eq!(*log.borrow(), vec!["a:gamepad-cross-on", "b:gamepad-cross-on"]);
    }

    #[test]
    fn test_publish_without_listeners(){
        let bus = EventBus::new();
        assert_eq!(bus.publish("nobody-home"), 0);
        assert_eq!(bus.published_count(), 1);
    }

    #[test]
    fn test_unsubscribe(){
        let bus = EventBus::new();
        let (log, make) = recorder();
        let a = bus.subscribe_rc("x", make("a"));
        bus.subscribe_rc("x", make("b"));

        assert!(bus.unsubscribe("x", a));
        assert!(!bus.unsubscribe("x", a));
        assert!(!bus.unsubscribe("y", a));

        bus.publish("x");
        assert_eq!(*log.borrow(), vec!["b:x"]);
        assert_eq!(bus.listener_count("x"), 1);
    }

    #[test]
    fn test_unsubscribe_during_delivery_does_not_skip(){
        let bus = EventBus::new();
        let (log, make) = recorder();
        let victim: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let victim_ref = Rc::clone(&victim);
        let log_first = Rc::clone(&log);
        bus.subscribe("x", move |bus, event|{
            log_first.borrow_mut().push(format!("first:{}", event));
            if let Some(id) = victim_ref.get(){
                bus.unsubscribe("x", id);
            }
        });
        victim.set(Some(bus.subscribe_rc("x", make("second"))));

        //removal happens mid-pass; the snapshot still delivers to "second"
        bus.publish("x");
        assert_eq!(*log.borrow(), vec!["first:x", "second:x"]);

        log.borrow_mut().clear();
        bus.publish("x");
        assert_eq!(*log.borrow(), vec!["first:x"]);
    }

    #[test]
    fn test_subscribe_during_delivery_takes_effect_next_publish(){
        let bus = EventBus::new();
        let (log, make) = recorder();
        let added = Rc::new(Cell::new(false));

        let added_ref = Rc::clone(&added);
        bus.subscribe("x", move |bus, _|{
            if !added_ref.get(){
                added_ref.set(true);
                bus.subscribe_rc("x", make("late"));
            }
        });

        assert_eq!(bus.publish("x"), 1);
        assert!(log.borrow().is_empty());

        assert_eq!(bus.publish("x"), 2);
        assert_eq!(*log.borrow(), vec!["late:x"]);
    }

    #[test]
    fn test_self_unsubscribe(){
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let hits_ref = Rc::clone(&hits);
        let own_ref = Rc::clone(&own_id);
        let id = bus.subscribe("once", move |bus, event|{
            hits_ref.set(hits_ref.get() + 1);
            if let Some(id) = own_ref.get(){
                bus.unsubscribe(event, id);
            }
        });
        own_id.set(Some(id));

        bus.publish("once");
        bus.publish("once");
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count("once"), 0);
    }
}
