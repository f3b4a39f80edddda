//! Request counters for the route layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters kept by the route layer.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    /// Total requests handled.
    pub total_requests: AtomicU64,
    /// Total user-visible errors (validation failures, unknown codes).
    pub total_errors: AtomicU64,
    /// Courses added through the form.
    pub courses_added: AtomicU64,
    /// Courses deleted.
    pub courses_deleted: AtomicU64,
}

impl RequestMetrics {
    /// Records a handled request.
    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a user-visible error.
    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a course added to the catalog.
    pub fn record_course_added(&self) {
        self.courses_added.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a course deleted from the catalog.
    pub fn record_course_deleted(&self) {
        self.courses_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of requests.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Returns the total number of user-visible errors.
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    /// Returns the number of courses added.
    #[must_use]
    pub fn added(&self) -> u64 {
        self.courses_added.load(Ordering::Relaxed)
    }

    /// Returns the number of courses deleted.
    #[must_use]
    pub fn deleted(&self) -> u64 {
        self.courses_deleted.load(Ordering::Relaxed)
    }
}

/// Timer for measuring handler duration.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Starts a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the elapsed duration in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
