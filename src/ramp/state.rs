#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampPhase{
    Idle,
    Ramping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStep{
    pub value: f32,
    pub finished: bool,
}

/// One in-flight transition from `initial` to `target`.
///
/// Tick k sits at fraction `k * period / duration`. The first tick whose
/// fraction exceeds 1.0 lands exactly on `target` and finishes the ramp.
/// Values are clamped between the endpoints, so the sequence is monotonic
/// and never overshoots.
#[derive(Debug, Clone, PartialEq)]
pub struct RampState{
    pub initial: f32,
    pub current: f32,
    pub target: f32,
    //fraction advanced per tick
    pub increment: f32,
    period_ms: u64,
    duration_ms: u64,
    elapsed_ms: u64,
}

impl RampState{
    pub fn new(initial: f32, target: f32, period_ms: u64, duration_ms: u64) -> Self{
        let increment = if duration_ms == 0{
            f32::INFINITY
        }else{
            period_ms as f32 / duration_ms as f32
        };

        RampState{
            initial,
            current: initial,
            target,
            increment,
            period_ms,
            duration_ms,
            elapsed_ms: 0,
        }
    }

    pub fn step(&mut self) -> RampStep{
        if self.elapsed_ms > self.duration_ms{
            self.current = self.target;
            return RampStep{ value: self.target, finished: true };
        }

        let fraction = if self.duration_ms == 0{
            1.0
        }else{
            self.elapsed_ms as f32 / self.duration_ms as f32
        };

        let (lo, hi) = if self.initial <= self.target{
            (self.initial, self.target)
        }else{
            (self.target, self.initial)
        };
        self.current = (self.initial + (self.target - self.initial) * fraction).clamp(lo, hi);
        self.elapsed_ms += self.period_ms;

        RampStep{ value: self.current, finished: false }
    }

    pub fn fraction(&self) -> f32{
        if self.duration_ms == 0{
            return 1.0;
        }
        (self.elapsed_ms as f32 / self.duration_ms as f32).min(1.0)
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    fn run(mut ramp: RampState) -> Vec<RampStep>{
        let mut steps = Vec::new();
        loop{
            let step = ramp.step();
            steps.push(step);
            if step.finished{
                return steps;
            }
            assert!(steps.len() < 10_000, "ramp never finished");
        }
    }

    #[test]
    fn test_ramp_up(){
        let steps = run(RampState::new(0.5, 1.0, 20, 1000));
        assert_eq!(steps[0].value, 0.5);
        assert!((steps[1].value - 0.51).abs() < 1e-6);
        //ticks 0..=50 in range, tick 51 exceeds 1.0
        assert_eq!(steps.len(), 52);
        assert_eq!(steps.last().unwrap().value, 1.0);
        assert!(steps.windows(2).all(|w| w[0].value <= w[1].value));
    }

    #[test]
    fn test_ramp_down(){
        let steps = run(RampState::new(100.0, -40.0, 66, 500));
        assert!(steps.windows(2).all(|w| w[0].value >= w[1].value));
        assert!(steps.iter().all(|s| s.value >= -40.0 && s.value <= 100.0));
        assert_eq!(steps.last().unwrap().value, -40.0);
    }

    #[test]
    fn test_zero_duration(){
        let steps = run(RampState::new(0.0, 1.0, 20, 0));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].value, 1.0);
        assert!(steps[1].finished);
    }

    #[test]
    fn test_period_longer_than_duration(){
        let steps = run(RampState::new(0.0, 10.0, 200, 150));
        assert_eq!(steps.iter().map(|s| s.value).collect::<Vec<_>>(), vec![0.0, 10.0]);
    }
}
