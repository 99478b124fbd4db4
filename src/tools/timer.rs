//! Simple stage timer. Each call to mark() charges the time since the previous mark to a label,
//! so a run can be broken down into setup, counting, tree building, packing and so on.

use std::time::{Duration, Instant};

use log::{info, log, Level};
use rustc_hash::FxHashMap;

/// Level of the closing "Time to ..." line. Release builds compile out everything below warn, and the
/// total time is always reported.
pub const REPORT_LEVEL: Level = Level::Warn;

#[derive(Debug)]
pub struct Timer {
    /// When the timer was created.
    start: Instant,
    /// When mark() was last called.
    last: Instant,
    /// Accumulated time per label.
    totals: FxHashMap<&'static str, Duration>,
    /// Labels in the order they were first seen, for reporting.
    order: Vec<&'static str>,
}

impl Timer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            totals: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Charge the time since the last mark to `label`.
    pub fn mark(&mut self, label: &'static str) {
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        match self.totals.get_mut(label) {
            Some(total) => *total += elapsed,
            None => {
                self.totals.insert(label, elapsed);
                self.order.push(label);
            }
        }
    }

    /// Time accumulated under `label` so far.
    pub fn total(&self, label: &str) -> Duration {
        self.totals.get(label).copied().unwrap_or_default()
    }

    /// Time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Log each label (info), then the overall time at REPORT_LEVEL.
    pub fn report(&self, what: &str) {
        for label in &self.order {
            info!("{:>8}: {:?}", label, self.total(label));
        }
        log!(REPORT_LEVEL, "Time to {}: {:?}", what, self.elapsed());
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
