use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

//millisecond time source shared by the assembler and the ramp controllers
pub trait Clock{
    fn now_ms(&self) -> u64;
}

//wall time, counted from creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock{
    origin: Instant,
}

impl MonotonicClock{
    pub fn new() -> Self{
        MonotonicClock{ origin: Instant::now() }
    }
}

impl Default for MonotonicClock{
    fn default() -> Self{
        Self::new()
    }
}

impl Clock for MonotonicClock{
    fn now_ms(&self) -> u64{
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock. Clones share the same time, so one handle can be
/// advanced while the assembler and controllers read through theirs.
#[derive(Debug, Clone, Default)]
pub struct ManualClock{
    now: Rc<Cell<u64>>,
}

impl ManualClock{
    pub fn new(start_ms: u64) -> Self{
        ManualClock{ now: Rc::new(Cell::new(start_ms)) }
    }

    pub fn set(&self, ms: u64){
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64){
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock{
    fn now_ms(&self) -> u64{
        self.now.get()
    }
}
