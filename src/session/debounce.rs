//! Single-slot debounce timer driven by host time.
//!
//! The host passes its clock (`performance.now()` in the browser) into every
//! call, so there is no timer state outside this struct and tests control
//! time directly.

use tracing::debug;

#[derive(Debug, Clone)]
struct Pending<T> {
    deadline: f64,
    task: T,
}

/// Holds at most one pending task. Scheduling a new task replaces the old
/// one and pushes the deadline out again.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: f64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Schedule `task` to fire `delay_ms` after `now`.
    /// Returns true if a pending task was cancelled.
    pub fn schedule(&mut self, now: f64, task: T) -> bool {
        let replaced = self.pending.is_some();
        if replaced {
            debug!("pending request replaced");
        }
        self.pending = Some(Pending {
            deadline: now + self.delay_ms,
            task,
        });
        replaced
    }

    /// Drop the pending task, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.task)
    }

    /// Take the pending task once its deadline has passed.
    pub fn poll(&mut self, now: f64) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.cancel(),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut debouncer = Debouncer::new(1000.0);
        assert!(!debouncer.schedule(0.0, "a"));
        assert_eq!(debouncer.poll(999.0), None);
        assert_eq!(debouncer.poll(1000.0), Some("a"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(5000.0), None);
    }

    #[test]
    fn test_new_input_replaces_pending() {
        let mut debouncer = Debouncer::new(1000.0);
        debouncer.schedule(0.0, "1");
        assert!(debouncer.schedule(600.0, "12"));
        assert_eq!(debouncer.deadline(), Some(1600.0));
        assert_eq!(debouncer.poll(1200.0), None);
        assert_eq!(debouncer.poll(1600.0), Some("12"));
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(10.0);
        debouncer.schedule(0.0, 7);
        assert_eq!(debouncer.cancel(), Some(7));
        assert_eq!(debouncer.poll(100.0), None);
        assert_eq!(debouncer.cancel(), None);
    }
}
