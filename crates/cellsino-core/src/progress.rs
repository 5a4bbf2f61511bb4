//! Progress reporting.
//!
//! Counters are shared with observers (a progress bar, another thread) and
//! are only ever incremented by the computation.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// A counter the acquisition loop can increment.
pub trait ProgressSink: Sync {
    fn add(&self, delta: u64);
}

impl ProgressSink for AtomicU64 {
    fn add(&self, delta: u64) {
        self.fetch_add(delta, Ordering::Relaxed);
    }
}

impl ProgressSink for AtomicUsize {
    fn add(&self, delta: u64) {
        self.fetch_add(delta as usize, Ordering::Relaxed);
    }
}

/// Optional counters of completed and expected frames.
#[derive(Clone, Copy, Default)]
pub struct Progress<'a> {
    pub completed: Option<&'a dyn ProgressSink>,
    pub total: Option<&'a dyn ProgressSink>,
}

impl<'a> Progress<'a> {
    /// No reporting.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(completed: &'a dyn ProgressSink, total: &'a dyn ProgressSink) -> Self {
        Self {
            completed: Some(completed),
            total: Some(total),
        }
    }

    pub(crate) fn add_total(&self, frames: usize) {
        if let Some(total) = self.total {
            total.add(frames as u64);
        }
    }

    pub(crate) fn frame_done(&self) {
        if let Some(completed) = self.completed {
            completed.add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let done = AtomicU64::new(0);
        let total = AtomicUsize::new(5);
        let progress = Progress::new(&done, &total);
        progress.add_total(3);
        progress.frame_done();
        progress.frame_done();
        assert_eq!(done.load(Ordering::Relaxed), 2);
        assert_eq!(total.load(Ordering::Relaxed), 8);
    }

    #[test]
    fn test_none_is_silent() {
        let progress = Progress::none();
        progress.add_total(10);
        progress.frame_done();
        assert!(progress.completed.is_none());
    }
}
