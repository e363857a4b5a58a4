//! Progress tracking for batch runs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// A progress update event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// The batch has started.
    Started { total: usize },
    /// One image was written.
    ImageCompleted {
        path: PathBuf,
        duration_ms: u64,
        /// Images finished so far, this one included
        index: usize,
        total: usize,
    },
    /// One image failed without stopping the batch.
    ImageFailed { path: PathBuf, message: String },
    /// The batch was stopped by a fatal error.
    Cancelled,
    /// The batch has finished.
    Completed {
        succeeded: usize,
        failed: usize,
        total_duration_ms: u64,
    },
}

/// Callback type for progress updates.
pub type ProgressCallback = Box<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Counts finished images across worker threads and allows cancellation.
pub struct ProgressTracker {
    total: usize,
    succeeded: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicBool,
    start_time: Instant,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    /// Create a tracker for `total` images. The clock starts now.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            start_time: Instant::now(),
            callback: None,
        }
    }

    /// Set a callback for progress updates.
    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Announce the start of the batch.
    pub fn start(&self) {
        self.send_update(ProgressUpdate::Started { total: self.total });
    }

    /// Report that an image was written.
    pub fn image_completed(&self, path: PathBuf, duration_ms: u64) {
        let index = self.succeeded.fetch_add(1, Ordering::Relaxed) as usize + 1
            + self.failed.load(Ordering::Relaxed) as usize;
        self.send_update(ProgressUpdate::ImageCompleted {
            path,
            duration_ms,
            index,
            total: self.total,
        });
    }

    /// Report that an image failed.
    pub fn image_failed(&self, path: PathBuf, message: String) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.send_update(ProgressUpdate::ImageFailed { path, message });
    }

    /// Check if the batch should stop.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation. Only the first request is reported.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::Relaxed) {
            self.send_update(ProgressUpdate::Cancelled);
        }
    }

    /// Report the end of the batch.
    pub fn complete(&self) {
        self.send_update(ProgressUpdate::Completed {
            succeeded: self.succeeded(),
            failed: self.failed(),
            total_duration_ms: self.elapsed_ms(),
        });
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed) as usize
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed) as usize
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Get current progress percentage.
    pub fn progress_percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        ((self.succeeded() + self.failed()) as f32 / self.total as f32) * 100.0
    }

    fn send_update(&self, update: ProgressUpdate) {
        if let Some(ref callback) = self.callback {
            callback(update);
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_progress_calculation() {
        let tracker = ProgressTracker::new(4);
        assert_eq!(tracker.progress_percent(), 0.0);

        tracker.image_completed(PathBuf::from("a.png"), 5);
        tracker.image_failed(PathBuf::from("b.png"), "bad".to_string());
        assert_eq!(tracker.progress_percent(), 50.0);
        assert_eq!(tracker.succeeded(), 1);
        assert_eq!(tracker.failed(), 1);

        assert_eq!(ProgressTracker::default().progress_percent(), 100.0);
    }

    #[test]
    fn test_cancellation_reported_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let tracker = ProgressTracker::new(3).with_callback(Box::new(move |update: ProgressUpdate| {
            if update == ProgressUpdate::Cancelled {
                count_clone.fetch_add(1, Ordering::Relaxed);
            }
        }));

        assert!(!tracker.is_cancelled());
        tracker.cancel();
        tracker.cancel();
        assert!(tracker.is_cancelled());
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_callback_sequence() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let updates_clone = updates.clone();
        let tracker = ProgressTracker::new(2).with_callback(Box::new(move |update: ProgressUpdate| {
            updates_clone.lock().unwrap().push(update);
        }));

        tracker.start();
        tracker.image_completed(PathBuf::from("a.png"), 10);
        tracker.image_completed(PathBuf::from("b.png"), 12);
        tracker.complete();

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 4);
        assert_eq!(updates[0], ProgressUpdate::Started { total: 2 });
        assert!(matches!(
            updates[2],
            ProgressUpdate::ImageCompleted { index: 2, total: 2, .. }
        ));
        assert!(matches!(
            updates[3],
            ProgressUpdate::Completed { succeeded: 2, failed: 0, .. }
        ));
    }
}
