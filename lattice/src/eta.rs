//! Progress estimation for long enumerations.
//!
//! An [`Eta`] is created before a loop with the number of iterations and an
//! interval. Every `interval` calls to [`Eta::update`] it measures the time of
//! the last interval, extrapolates it to the remaining work, and logs the
//! estimate at `info` level.

use std::time::Instant;

use tracing::info;

/// Estimated time of arrival of a loop.
#[derive(Debug)]
pub struct Eta {
    start: Instant,
    interval_start: Instant,
    total: usize,
    interval: usize,
    counter: usize,
    eta_minutes: Option<f64>,
}

impl Eta {
    /// Tracks `total` iterations, reporting every `interval` (zero means one).
    pub fn new(total: usize, interval: usize) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            interval_start: now,
            total,
            interval: interval.max(1),
            counter: 0,
            eta_minutes: None,
        }
    }

    /// Records one finished iteration; `info` is attached to the report.
    pub fn update(&mut self, info: &str) {
        if self.counter % self.interval == 0 {
            self.interval_start = Instant::now();
        }
        self.counter += 1;
        if self.counter % self.interval != 0 {
            return;
        }
        let per_iteration = self.interval_start.elapsed().as_secs_f64() / (60.0 * self.interval as f64);
        let remaining = self.total.saturating_sub(self.counter) as f64;
        let eta = per_iteration * remaining;
        self.eta_minutes = Some(eta);
        info!(
            eta_minutes = format!("{eta:.5}"),
            counter = self.counter,
            total = self.total,
            elapsed_minutes = format!("{:.5}", self.start.elapsed().as_secs_f64() / 60.0),
            info,
            "progress"
        );
    }

    /// Iterations recorded so far.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Total number of iterations.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Latest estimate in minutes, once an interval has completed.
    pub fn eta_minutes(&self) -> Option<f64> {
        self.eta_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_appears_after_each_interval() {
        let mut eta = Eta::new(10, 3);
        eta.update("a");
        eta.update("b");
        assert_eq!(eta.eta_minutes(), None);
        eta.update("c");
        assert!(eta.eta_minutes().is_some_and(|m| m >= 0.0));
        assert_eq!(eta.counter(), 3);
        assert_eq!(eta.total(), 10);
    }

    #[test]
    fn zero_interval_reports_every_step() {
        let mut eta = Eta::new(2, 0);
        eta.update("");
        assert!(eta.eta_minutes().is_some());
    }
}
