//! Periodic timers driven by the UI loop.
//!
//! Timers never fire on their own; the loop polls them once per frame with
//! the current instant. A paused timer is not due, and resuming restarts the
//! period from the resume instant (missed ticks are dropped, not replayed).

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTimer {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: Some(now + period),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// True once per elapsed period. Fires at most once per call.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    pub fn pause(&mut self) {
        self.next_due = None;
    }

    pub fn resume(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.period);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.next_due.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_secs(30);

    #[test]
    fn fires_after_period() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(PERIOD, t0);
        assert!(!timer.poll(t0 + Duration::from_secs(29)));
        assert!(timer.poll(t0 + PERIOD));
        assert!(!timer.poll(t0 + PERIOD));
    }

    #[test]
    fn long_gap_fires_once() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(PERIOD, t0);
        let late = t0 + Duration::from_secs(300);
        assert!(timer.poll(late));
        assert!(!timer.poll(late + Duration::from_secs(1)));
    }

    #[test]
    fn paused_timer_never_fires_and_resumes_without_catch_up() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(PERIOD, t0);
        timer.pause();
        assert!(timer.is_paused());
        assert!(!timer.poll(t0 + Duration::from_secs(120)));

        let back = t0 + Duration::from_secs(120);
        timer.resume(back);
        assert!(!timer.poll(back));
        assert!(!timer.poll(back + Duration::from_secs(29)));
        assert!(timer.poll(back + PERIOD));
    }

    #[test]
    fn resume_while_running_keeps_schedule() {
        let t0 = Instant::now();
        let mut timer = PeriodicTimer::new(PERIOD, t0);
        timer.resume(t0 + Duration::from_secs(20));
        assert!(timer.poll(t0 + PERIOD));
    }
}
