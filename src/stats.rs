//! Request and write statistics for the service.
//!
//! Counters are plain atomics updated by the HTTP handlers and rendered as a
//! plain-text table by the `/health` endpoint.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Thread-safe circular buffer for tracking HTTP request timestamps.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(1024)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            // Keep only last 10 minutes of timestamps to avoid unbounded growth
            if let Some(cutoff) = now.checked_sub(Duration::from_secs(600)) {
                while guard.front().is_some_and(|&t| t < cutoff) {
                    guard.pop_front();
                }
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            match Instant::now().checked_sub(Duration::from_secs(60)) {
                Some(cutoff) => guard.iter().filter(|&&t| t >= cutoff).count() as u64,
                None => guard.len() as u64,
            }
        } else {
            0
        }
    }
}

/// Service-wide counters.
pub struct ServiceStats {
    pub http_request_timestamps: RequestTimestamps,
    pub requests_total: AtomicU64,
    pub rejected_requests: AtomicU64,
    pub created_total: AtomicU64,
    pub replaced_total: AtomicU64,
    pub deleted_total: AtomicU64,
    pub persistence_failures: AtomicU64,
    pub start_time: Instant,
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self {
            http_request_timestamps: RequestTimestamps::default(),
            requests_total: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            created_total: AtomicU64::new(0),
            replaced_total: AtomicU64::new(0),
            deleted_total: AtomicU64::new(0),
            persistence_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl ServiceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_http_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_timestamps.record();
    }

    pub fn record_rejected(&self) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_created(&self) {
        self.created_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replaced(&self) {
        self.replaced_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deleted(&self) {
        self.deleted_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Renders the counters as a plain-text table.
    pub fn render_table(&self, endpoint_count: usize) -> String {
        let rows = [
            ("endpoints stored", endpoint_count as u64),
            ("requests total", self.requests_total.load(Ordering::Relaxed)),
            (
                "requests last minute",
                self.http_request_timestamps.count_last_minute(),
            ),
            (
                "rejected requests",
                self.rejected_requests.load(Ordering::Relaxed),
            ),
            ("endpoints created", self.created_total.load(Ordering::Relaxed)),
            ("endpoints replaced", self.replaced_total.load(Ordering::Relaxed)),
            ("endpoints deleted", self.deleted_total.load(Ordering::Relaxed)),
            (
                "persistence failures",
                self.persistence_failures.load(Ordering::Relaxed),
            ),
        ];

        let mut out = String::new();
        writeln!(out, "{:24} | {:>12}", "counter", "value").ok();
        writeln!(out, "{}", "-".repeat(39)).ok();
        for (name, value) in rows {
            writeln!(out, "{:24} | {:>12}", name, value).ok();
        }
        out
    }
}
