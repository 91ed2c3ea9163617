use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::pledge::ErrorCategory;

/// Pledge submission counters
#[derive(Debug, Default)]
pub struct PledgeMetrics {
    pub attempts: AtomicU64,
    pub successes: AtomicU64,
    pub user_rejections: AtomicU64,
    pub confirmation_timeouts: AtomicU64,
    pub unknown_failures: AtomicU64,
    pub validation_failures: AtomicU64,
    pub persistence_failures: AtomicU64,
    pub rejected_concurrent_runs: AtomicU64,
}

impl PledgeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, category: ErrorCategory) {
        let counter = match category {
            ErrorCategory::UserRejected => &self.user_rejections,
            ErrorCategory::ConfirmationTimeout => &self.confirmation_timeouts,
            ErrorCategory::Unknown => &self.unknown_failures,
            ErrorCategory::ValidationFailure => &self.validation_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_run(&self) {
        self.rejected_concurrent_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> PledgeStats {
        PledgeStats {
            attempts: self.attempts.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            user_rejections: self.user_rejections.load(Ordering::Relaxed),
            confirmation_timeouts: self.confirmation_timeouts.load(Ordering::Relaxed),
            unknown_failures: self.unknown_failures.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            rejected_concurrent_runs: self.rejected_concurrent_runs.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Pledge metrics: attempts={}, successes={}, rejected={}, timeouts={}, unknown={}, invalid={}, persistence_failures={}",
            stats.attempts,
            stats.successes,
            stats.user_rejections,
            stats.confirmation_timeouts,
            stats.unknown_failures,
            stats.validation_failures,
            stats.persistence_failures
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PledgeStats {
    pub attempts: u64,
    pub successes: u64,
    pub user_rejections: u64,
    pub confirmation_timeouts: u64,
    pub unknown_failures: u64,
    pub validation_failures: u64,
    pub persistence_failures: u64,
    pub rejected_concurrent_runs: u64,
}

impl PledgeStats {
    pub fn failures(&self) -> u64 {
        self.user_rejections
            + self.confirmation_timeouts
            + self.unknown_failures
            + self.validation_failures
    }
}

/// Global metrics instance
static PLEDGE_METRICS: std::sync::LazyLock<PledgeMetrics> =
    std::sync::LazyLock::new(PledgeMetrics::new);

pub fn pledge_metrics() -> &'static PledgeMetrics {
    &PLEDGE_METRICS
}
