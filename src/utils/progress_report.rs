//! Progress reporting for long-running operations.
//!
//! Scanning a module library can load dozens of archives. Callers receive
//! periodic updates and may cancel the scan from the callback.
//!
//! # Examples
//!
//! ```
//! use sword::utils::{ProgressState, ProgressReportFn};
//!
//! fn my_reporter(state: &mut ProgressState) -> bool {
//!     println!("{}: {}/{}", state.state_id, state.current + 1, state.total);
//!     false // Return true to cancel the operation
//! }
//!
//! let mut progress = ProgressState::new("loading", 20, 10, Some(my_reporter));
//! for i in 0..20 {
//!     if progress.report(i) {
//!         break;
//!     }
//! }
//! ```

/// Function type for progress reporting callbacks.
///
/// The function receives a mutable reference to the progress state and
/// returns `true` to cancel the operation, or `false` to continue.
pub type ProgressReportFn = fn(&mut ProgressState) -> bool;

/// State information for progress reporting.
pub struct ProgressState {
    /// Identifier for this progress state (e.g., "loading")
    pub state_id: String,
    /// Total number of items to process
    pub total: u64,
    /// Message describing the last failure, if any
    pub error_msg: String,
    /// Current item being processed
    pub current: u64,
    /// Last item at which progress was reported
    pub last: u64,
    /// Number of items between progress reports
    pub report_interval: u64,
    /// Optional reporter function to call
    pub reporter: Option<ProgressReportFn>,
}

impl ProgressState {
    /// Creates a new progress state.
    ///
    /// # Arguments
    ///
    /// * `state_id` - Identifier for this progress state
    /// * `total` - Total number of items to process
    /// * `report_interval_percent` - Percentage of items between reports (0-100)
    /// * `reporter` - Optional reporter function
    pub fn new(state_id: &str, total: u64, report_interval_percent: u64, reporter: Option<ProgressReportFn>) -> Self {
        Self {
            state_id: state_id.to_string(),
            total,
            error_msg: String::new(),
            current: 0,
            last: 0,
            report_interval: total * report_interval_percent / 100,
            reporter,
        }
    }

    /// Reports progress for the current item.
    ///
    /// The reporter runs for the first item, whenever more than
    /// `report_interval` items passed since the last report, and for the last item.
    ///
    /// # Returns
    ///
    /// Returns `true` if the operation should be cancelled, `false` otherwise.
    pub fn report(&mut self, current: u64) -> bool {
        let Some(reporter) = self.reporter else {
            return false;
        };
        let is_first = current == 0;
        let is_last = current + 1 >= self.total;
        if is_first || is_last || current - self.last.min(current) > self.report_interval {
            self.current = current;
            let cancelled = reporter(self);
            self.last = current;
            return cancelled;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancel_at_third(state: &mut ProgressState) -> bool {
        state.current >= 2
    }

    #[test]
    fn test_reporter_can_cancel() {
        let mut progress = ProgressState::new("loading", 5, 0, Some(cancel_at_third));
        assert!(!progress.report(0));
        assert!(!progress.report(1));
        assert!(progress.report(2));
        assert_eq!(progress.last, 2);
    }

    #[test]
    fn test_without_reporter() {
        let mut progress = ProgressState::new("loading", 0, 10, None);
        assert!(!progress.report(0));
    }
}
