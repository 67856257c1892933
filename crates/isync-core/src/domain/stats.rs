//! Traversal statistics

use std::time::Duration;

/// Bytes per (decimal) gigabyte
const BYTES_PER_GB: f64 = 1000.0 * 1000.0 * 1000.0;

/// Decimal places kept in the running gigabyte total
const SIZE_GB_PRECISION: i32 = 4;

/// Counters accumulated while walking the remote tree
///
/// The walker owns one value per walk and returns it with the listing;
/// nothing here is shared or global. `size_gb` is rounded after every
/// addition, matching how the total is reported to the operator, while
/// `total_bytes` keeps the exact sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    /// Number of file nodes discovered
    pub files_found: u64,
    /// Exact sum of reported file sizes
    pub total_bytes: u64,
    /// Running size total in gigabytes, rounded to four decimals
    pub size_gb: f64,
    /// Summed wall time spent listing containers
    pub traversal_time: Duration,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one discovered file of `size` bytes
    pub fn record_file(&mut self, size: u64) {
        self.files_found += 1;
        self.total_bytes = self.total_bytes.saturating_add(size);
        self.size_gb = round_gb(self.size_gb + size as f64 / BYTES_PER_GB);
    }

    /// Adds the time spent on one container listing
    pub fn record_listing(&mut self, elapsed: Duration) {
        self.traversal_time += elapsed;
    }

    /// Folds the stats of an independently walked subtree into this one
    pub fn merge(&mut self, other: &SyncStats) {
        self.files_found += other.files_found;
        self.total_bytes = self.total_bytes.saturating_add(other.total_bytes);
        self.size_gb = round_gb(self.size_gb + other.size_gb);
        self.traversal_time += other.traversal_time;
    }
}

fn round_gb(value: f64) -> f64 {
    let factor = 10f64.powi(SIZE_GB_PRECISION);
    (value * factor).round() / factor
}
