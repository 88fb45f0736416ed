use core::time::Duration;
use web_time::Instant;

use crate::*;

const TICK: Duration = Duration::from_secs(1);

/// Elapsed-seconds counter driven by a once-per-second schedule.
///
/// The event loop calls [`Timer::poll`] from its own interval; every whole second that
/// passed since the last tick increments the count by one. Stopping cancels the
/// schedule, so a finished game never ticks again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timer {
    elapsed: Option<Secs>,
    next_tick: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until started, then frozen once stopped.
    pub fn elapsed(&self) -> Option<Secs> {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Starts counting from zero. A timer that already started is left alone.
    pub fn start(&mut self, now: Instant) {
        if self.elapsed.is_some() {
            return;
        }
        log::debug!("Timer started");
        self.elapsed = Some(0);
        self.next_tick = Some(now + TICK);
    }

    /// Emits every tick that came due by `now`, returning how many fired.
    pub fn poll(&mut self, now: Instant) -> Secs {
        let mut fired = 0;
        while let Some(due) = self.next_tick.filter(|&due| due <= now) {
            self.tick();
            self.next_tick = Some(due + TICK);
            fired += 1;
        }
        fired
    }

    /// Time until the next tick is due, `None` when not running.
    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|due| due.saturating_duration_since(now))
    }

    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            log::debug!("Timer stopped at {:?}s", self.elapsed);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn tick(&mut self) {
        if let Some(elapsed) = &mut self.elapsed {
            *elapsed = elapsed.saturating_add(1);
        }
    }
}
