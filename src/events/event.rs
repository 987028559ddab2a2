use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity{
    On,
    Off,
}

impl Polarity{
    pub fn from_bit(set: bool) -> Self{
        if set { Polarity::On } else { Polarity::Off }
    }

    pub fn as_str(&self) -> &'static str{
        match self{
            Polarity::On => "on",
            Polarity::Off => "off",
        }
    }
}

/// Decoded input event, e.g. `gamepad-cross-on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemanticEvent{
    pub source: &'static str,
    pub control: &'static str,
    pub polarity: Polarity,
}

impl SemanticEvent{
    pub fn new(source: &'static str, control: &'static str, polarity: Polarity) -> Self{
        SemanticEvent{ source, control, polarity }
    }

    /// Bus key for this event.
    pub fn name(&self) -> String{
        self.to_string()
    }

    pub fn is_on(&self) -> bool{
        self.polarity == Polarity::On
    }
}

impl fmt::Display for SemanticEvent{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result{
        write!(f, "{}-{}-{}", self.source, self.control, self.polarity.as_str())
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_event_name(){
        let on = SemanticEvent::new("gamepad", "cross", Polarity::On);
        let off = SemanticEvent::new("gamepad", "up", Polarity::from_bit(false));
        assert_eq!(on.name(), "gamepad-cross-on");
        assert_eq!(off.name(), "gamepad-up-off");
        assert!(on.is_on());
        assert!(!off.is_on());
    }
}
