use std::ops::RangeInclusive;

use alloy::primitives::BlockNumber;

/// Result of a failed window fetch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The window was halved to `size` blocks and will be retried at the same start.
    Shrunk { size: u64 },
    /// The window was a single block; it is given up and the scan moves past it.
    Skipped { block: BlockNumber },
}

/// Adaptive window walking an inclusive block range.
///
/// States are `(start, size)`. Transitions:
/// * success: advance past the window, then double `size` up to `max_size`
/// * failure on a window wider than one block: halve it, keep `start`
/// * failure on a single block: skip it and advance by one
///
/// Every transition either advances `start` or halves the window, so a range of `n` blocks is
/// finished after at most `n * (log2(max_size) + 1)` attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanWindow {
    start: BlockNumber,
    end: BlockNumber,
    size: u64,
    max_size: u64,
    finished: bool,
}

impl ScanWindow {
    /// Creates a window over `range` whose size never exceeds `max_size`. A `max_size` of 0 is
    /// treated as 1.
    #[must_use]
    pub fn new(range: RangeInclusive<BlockNumber>, max_size: u64) -> Self {
        let max_size = max_size.max(1);
        let (start, end) = (*range.start(), *range.end());
        Self { start, end, size: max_size, max_size, finished: start > end }
    }

    /// The window to fetch next, or `None` once the range is exhausted.
    #[must_use]
    pub fn current(&self) -> Option<RangeInclusive<BlockNumber>> {
        (!self.finished).then(|| self.start..=self.current_end())
    }

    /// Current window size, i.e. the upper bound of the next window's length.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Marks the current window fetched.
    pub fn on_success(&mut self) {
        self.advance_past(self.current_end());
        self.size = self.size.saturating_mul(2).min(self.max_size);
    }

    /// Records a failed fetch of the current window.
    pub fn on_failure(&mut self) -> FailureOutcome {
        let len = self.current_end() - self.start + 1;
        if len > 1 {
            self.size = len / 2;
            return FailureOutcome::Shrunk { size: self.size };
        }

        let block = self.start;
        self.size = 1;
        self.advance_past(block);
        FailureOutcome::Skipped { block }
    }

    fn current_end(&self) -> BlockNumber {
        self.start.saturating_add(self.size - 1).min(self.end)
    }

    fn advance_past(&mut self, block: BlockNumber) {
        if block >= self.end {
            self.finished = true;
        } else {
            self.start = block + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_range_in_max_sized_windows() {
        let mut window = ScanWindow::new(100..=250, 50);

        let mut seen = vec![];
        while let Some(range) = window.current() {
            seen.push(range);
            window.on_success();
        }

        assert_eq!(seen, vec![100..=149, 150..=199, 200..=249, 250..=250]);
        assert!(window.is_finished());
    }

    #[test]
    fn failure_halves_and_retries_same_start() {
        let mut window = ScanWindow::new(0..=999, 1000);

        assert_eq!(window.on_failure(), FailureOutcome::Shrunk { size: 500 });
        assert_eq!(window.current(), Some(0..=499));
        assert_eq!(window.on_failure(), FailureOutcome::Shrunk { size: 250 });
        assert_eq!(window.current(), Some(0..=249));
    }

    #[test]
    fn failure_shrinks_relative_to_clamped_window() {
        let mut window = ScanWindow::new(0..=3, 1000);

        assert_eq!(window.current(), Some(0..=3));
        assert_eq!(window.on_failure(), FailureOutcome::Shrunk { size: 2 });
        assert_eq!(window.current(), Some(0..=1));
    }

    #[test]
    fn failure_at_single_block_skips_it() {
        let mut window = ScanWindow::new(10..=12, 1);

        assert_eq!(window.on_failure(), FailureOutcome::Skipped { block: 10 });
        assert_eq!(window.current(), Some(11..=11));
    }

    #[test]
    fn success_regrows_window_up_to_max() {
        let mut window = ScanWindow::new(0..=1000, 8);
        window.on_failure();
        window.on_failure();
        window.on_failure();
        assert_eq!(window.size(), 1);

        window.on_success();
        assert_eq!(window.current(), Some(1..=2));
        window.on_success();
        assert_eq!(window.current(), Some(3..=6));
        window.on_success();
        window.on_success();
        assert_eq!(window.size(), 8);
    }

    #[test]
    fn skipping_last_block_finishes() {
        let mut window = ScanWindow::new(5..=5, 10);

        assert_eq!(window.on_failure(), FailureOutcome::Skipped { block: 5 });
        assert_eq!(window.current(), None);
    }

    #[test]
    fn always_failing_range_terminates_within_bound() {
        let max_size = 16;
        let blocks = 100;
        let mut window = ScanWindow::new(0..=blocks - 1, max_size);

        let mut attempts = 0;
        let mut skipped = vec![];
        while window.current().is_some() {
            attempts += 1;
            if let FailureOutcome::Skipped { block } = window.on_failure() {
                skipped.push(block);
            }
            assert!(attempts <= blocks * (max_size.ilog2() as u64 + 1), "scan did not terminate");
        }

        assert_eq!(skipped, (0..blocks).collect::<Vec<_>>());
    }

    #[test]
    fn range_ending_at_max_block_terminates() {
        let mut window = ScanWindow::new(u64::MAX - 2..=u64::MAX, 2);

        assert_eq!(window.current(), Some(u64::MAX - 2..=u64::MAX - 1));
        window.on_success();
        assert_eq!(window.current(), Some(u64::MAX..=u64::MAX));
        window.on_success();
        assert_eq!(window.current(), None);
    }

    #[test]
    fn empty_range_is_finished() {
        assert_eq!(ScanWindow::new(10..=9, 5).current(), None);
    }
}
