use std::time::{Duration, Instant};

/// A cancellable deferred task.
///
/// The owner polls it with the current time; a due task fires once and is
/// cleared. Scheduling again replaces the pending task.
#[derive(Debug)]
pub struct Timer<T> {
    pending: Option<(Instant, T)>,
}

impl<T> Default for Timer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timer<T> {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) {
        self.pending = Some((now + delay, payload));
    }

    /// Cancel the pending task, returning its payload.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    /// Take the payload if the task is due at `now`.
    pub fn fire_due(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((due, _)) if now >= due => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_when_due() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, Duration::from_millis(50), 7);

        assert_eq!(timer.fire_due(t0 + Duration::from_millis(49)), None);
        assert_eq!(timer.fire_due(t0 + Duration::from_millis(50)), Some(7));
        assert_eq!(timer.fire_due(t0 + Duration::from_millis(60)), None);
        assert!(!timer.is_pending());
    }

    #[test]
    fn reschedule_replaces_pending_task() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, Duration::from_millis(50), "first");
        timer.schedule(t0 + Duration::from_millis(30), Duration::from_millis(50), "second");

        assert_eq!(timer.fire_due(t0 + Duration::from_millis(60)), None);
        assert_eq!(
            timer.fire_due(t0 + Duration::from_millis(80)),
            Some("second")
        );
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut timer = Timer::new();
        timer.schedule(t0, Duration::ZERO, ());
        assert_eq!(timer.cancel(), Some(()));
        assert_eq!(timer.fire_due(t0 + Duration::from_secs(1)), None);
    }
}
