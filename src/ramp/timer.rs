/// Cancellable repeating tick, driven by whoever owns it.
///
/// Nothing sleeps: the owner asks [`take_due`](Self::take_due) with the
/// current time and runs one tick per `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingTimer{
    period_ms: u64,
    next_due: Option<u64>,
}

impl RepeatingTimer{
    pub fn new(period_ms: u64) -> Self{
        assert!(period_ms > 0, "timer period must be non-zero");
        RepeatingTimer{ period_ms, next_due: None }
    }

    //first tick lands one period after `now`
    pub fn start(&mut self, now: u64){
        self.next_due = Some(now + self.period_ms);
    }

    pub fn cancel(&mut self){
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool{
        self.next_due.is_some()
    }

    pub fn period_ms(&self) -> u64{
        self.period_ms
    }

    pub fn set_period(&mut self, period_ms: u64){
        assert!(period_ms > 0, "timer period must be non-zero");
        self.period_ms = period_ms;
    }

    pub fn next_due(&self) -> Option<u64>{
        self.next_due
    }

    //call in a loop to catch up after a late poll
    pub fn take_due(&mut self, now: u64) -> bool{
        match self.next_due{
            Some(due) if now >= due =>{
                self.next_due = Some(due + self.period_ms);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_timer_ticks_each_period(){
        let mut timer = RepeatingTimer::new(20);
        assert!(!timer.take_due(100));

        timer.start(100);
        assert!(!timer.take_due(119));
        assert!(timer.take_due(120));
        assert!(!timer.take_due(120));
        assert!(timer.take_due(140));
    }

    #[test]
    fn test_timer_catch_up(){
        let mut timer = RepeatingTimer::new(20);
        timer.start(0);
        let mut ticks = 0;
        while timer.take_due(65){
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert_eq!(timer.next_due(), Some(80));
    }

    #[test]
    fn test_timer_cancel(){
        let mut timer = RepeatingTimer::new(66);
        timer.start(0);
        timer.cancel();
        assert!(!timer.is_active());
        assert!(!timer.take_due(1000));
    }
}
