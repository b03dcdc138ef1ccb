//! Single-slot render coalescing.
//!
//! State changes arrive faster than frames. Each change overwrites the one
//! pending request; the frame clock takes whatever is pending when it fires.
//! A superseded request is dropped without ever running.

/// Outcome of [`FrameScheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// The slot was empty.
    Queued,
    /// An earlier pending request was replaced.
    Superseded,
}

#[derive(Debug)]
pub struct FrameScheduler<T> {
    pending: Option<T>,
    superseded: u64,
    delivered: u64,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            pending: None,
            superseded: 0,
            delivered: 0,
        }
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending request with `request`.
    pub fn schedule(&mut self, request: T) -> Scheduled {
        match self.pending.replace(request) {
            Some(_) => {
                self.superseded += 1;
                tracing::trace!(superseded = self.superseded, "Pending render superseded");
                Scheduled::Superseded
            }
            None => Scheduled::Queued,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending request, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Frame-clock tick: run `f` on the pending request.
    ///
    /// Returns `None` when nothing was pending.
    pub fn on_frame<R>(&mut self, f: impl FnOnce(T) -> R) -> Option<R> {
        let request = self.pending.take()?;
        self.delivered += 1;
        Some(f(request))
    }

    /// Requests replaced before their frame.
    pub fn superseded_count(&self) -> u64 {
        self.superseded
    }

    /// Requests handed to a frame callback.
    pub fn delivered_count(&self) -> u64 {
        self.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_request_wins() {
        let mut scheduler = FrameScheduler::new();
        assert_eq!(scheduler.schedule(1), Scheduled::Queued);
        assert_eq!(scheduler.schedule(2), Scheduled::Superseded);
        assert_eq!(scheduler.schedule(3), Scheduled::Superseded);

        let mut ran = Vec::new();
        scheduler.on_frame(|n| ran.push(n));
        assert_eq!(ran, vec![3]);
        assert_eq!(scheduler.superseded_count(), 2);
        assert_eq!(scheduler.delivered_count(), 1);
    }

    #[test]
    fn test_idle_frame_runs_nothing() {
        let mut scheduler: FrameScheduler<u32> = FrameScheduler::new();
        assert_eq!(scheduler.on_frame(|n| n * 2), None);
        scheduler.schedule(4);
        assert_eq!(scheduler.on_frame(|n| n * 2), Some(8));
        assert_eq!(scheduler.on_frame(|n| n * 2), None);
    }

    #[test]
    fn test_cancel_clears_slot() {
        let mut scheduler = FrameScheduler::new();
        scheduler.schedule("a");
        assert!(scheduler.is_pending());
        assert_eq!(scheduler.cancel(), Some("a"));
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.schedule("b"), Scheduled::Queued);
    }
}
