//! # Print Timing Model
//!
//! The serial link has no flow control, so the driver predicts how long the
//! printer stays busy after each operation and holds back the next write
//! until that period is over.
//!
//! ## Model
//!
//! | Event | Busy period |
//! |-------|-------------|
//! | n bytes on the wire | n × byte_time |
//! | Text line | byte_time + char_height × dot_print + line_spacing × dot_feed |
//! | Blank line | byte_time + (char_height + line_spacing) × dot_feed |
//! | Feed lines | char_height × dot_feed |
//! | Feed rows | n × dot_feed |
//! | Barcode | (barcode_height + 40) × dot_print |
//! | Bitmap chunk | rows × dot_print |
//! | Self-test page | 24 × 26 × dot_print + (6 × 26 + 30) × dot_feed |
//!
//! `byte_time` is 11 bit periods per byte: start, 8 data, stop and one idle
//! bit of slack.
//!
//! Print and feed speed vary with supply voltage and paper stock, so the dot
//! times can be retuned at runtime with microsecond values.

use std::thread;
use std::time::{Duration, Instant};

/// Bit periods charged per byte on the wire.
pub const BITS_PER_BYTE: u64 = 11;

/// Default time to print one dot row.
pub const DEFAULT_DOT_PRINT_TIME: Duration = Duration::from_millis(30);

/// Default time to feed one blank dot row.
pub const DEFAULT_DOT_FEED_TIME: Duration = Duration::from_micros(2100);

/// Longest busy period the gate will schedule.
pub const MAX_BUSY: Duration = Duration::from_secs(24 * 60 * 60);

/// Extra dot rows a barcode takes beyond its bar height (label and margin).
const BARCODE_EXTRA_ROWS: u32 = 40;

/// Predicted busy periods for each kind of printer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingModel {
    pub byte_time: Duration,
    pub dot_print_time: Duration,
    pub dot_feed_time: Duration,
}

impl TimingModel {
    /// Model for a link running at `baud_rate` with default dot times.
    ///
    /// ```
    /// use std::time::Duration;
    /// use thermald::printer::timing::TimingModel;
    ///
    /// let model = TimingModel::new(19200);
    /// assert_eq!(model.byte_time, Duration::from_nanos(572_916));
    /// ```
    pub fn new(baud_rate: u32) -> Self {
        let baud = u64::from(baud_rate.max(1));
        Self {
            byte_time: Duration::from_nanos(BITS_PER_BYTE * 1_000_000_000 / baud),
            dot_print_time: DEFAULT_DOT_PRINT_TIME,
            dot_feed_time: DEFAULT_DOT_FEED_TIME,
        }
    }

    /// Replace the dot times, in microseconds.
    pub fn set_times(&mut self, print_us: u64, feed_us: u64) {
        self.dot_print_time = Duration::from_micros(print_us);
        self.dot_feed_time = Duration::from_micros(feed_us);
    }

    // Busy periods saturate instead of overflowing.

    pub fn bytes(&self, count: usize) -> Duration {
        self.byte_time
            .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
    }

    pub fn text_line(&self, char_height: u8, line_spacing: u8) -> Duration {
        self.byte_time
            .saturating_add(self.dot_print_time.saturating_mul(u32::from(char_height)))
            .saturating_add(self.dot_feed_time.saturating_mul(u32::from(line_spacing)))
    }

    pub fn blank_line(&self, char_height: u8, line_spacing: u8) -> Duration {
        let rows = u32::from(char_height) + u32::from(line_spacing);
        self.byte_time
            .saturating_add(self.dot_feed_time.saturating_mul(rows))
    }

    pub fn feed_lines(&self, char_height: u8) -> Duration {
        self.dot_feed_time.saturating_mul(u32::from(char_height))
    }

    pub fn feed_rows(&self, rows: u8) -> Duration {
        self.dot_feed_time.saturating_mul(u32::from(rows))
    }

    pub fn barcode(&self, barcode_height: u8) -> Duration {
        self.dot_print_time
            .saturating_mul(u32::from(barcode_height) + BARCODE_EXTRA_ROWS)
    }

    pub fn bitmap_chunk(&self, rows: u16) -> Duration {
        self.dot_print_time.saturating_mul(u32::from(rows))
    }

    /// The built-in self-test page: 26 lines of 24-dot text at spacing 6,
    /// plus 30 rows of trailing feed.
    pub fn test_page(&self) -> Duration {
        self.dot_print_time
            .saturating_mul(24 * 26)
            .saturating_add(self.dot_feed_time.saturating_mul(6 * 26 + 30))
    }
}

impl Default for TimingModel {
    fn default() -> Self {
        Self::new(crate::printer::config::DEFAULT_BAUD_RATE)
    }
}

// ============================================================================
// GATE
// ============================================================================

/// Blocks writes until the previously scheduled busy period has elapsed.
///
/// The deadline only ever moves forward. An unpaced gate keeps the same
/// bookkeeping but never sleeps, which is what pass-through sinks want.
#[derive(Debug, Clone)]
pub struct Gate {
    resume_at: Instant,
    paced: bool,
}

impl Gate {
    pub fn new(paced: bool) -> Self {
        Self {
            resume_at: Instant::now(),
            paced,
        }
    }

    /// Sleep until the deadline. Returns immediately if it has passed or the
    /// gate is unpaced.
    pub fn wait(&self) {
        if !self.paced {
            return;
        }
        let remaining = self.remaining();
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }

    /// Extend the deadline to at least `busy` from now. Busy periods are
    /// capped at [`MAX_BUSY`].
    pub fn schedule(&mut self, busy: Duration) {
        let now = Instant::now();
        let candidate = now
            .checked_add(busy.min(MAX_BUSY))
            .unwrap_or(self.resume_at.max(now));
        if candidate > self.resume_at {
            self.resume_at = candidate;
        }
    }

    pub fn resume_at(&self) -> Instant {
        self.resume_at
    }

    /// Time left until the deadline.
    pub fn remaining(&self) -> Duration {
        self.resume_at.saturating_duration_since(Instant::now())
    }

    pub fn is_paced(&self) -> bool {
        self.paced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> TimingModel {
        let mut model = TimingModel::new(19200);
        model.set_times(30_000, 2_100);
        model
    }

    #[test]
    fn test_byte_time_from_baud() {
        assert_eq!(TimingModel::new(9600).byte_time, Duration::from_nanos(1_145_833));
        assert_eq!(model().bytes(3), model().byte_time * 3);
    }

    #[test]
    fn test_zero_baud_does_not_divide_by_zero() {
        assert_eq!(TimingModel::new(0).byte_time, Duration::from_secs(11));
    }

    #[test]
    fn test_line_times() {
        let m = model();
        let text = m.text_line(24, 6);
        assert_eq!(text, m.byte_time + Duration::from_micros(720_000 + 12_600));

        let blank = m.blank_line(24, 6);
        assert_eq!(blank, m.byte_time + Duration::from_micros(63_000));
        assert!(blank < text);
    }

    #[test]
    fn test_feed_and_barcode_times() {
        let m = model();
        assert_eq!(m.feed_lines(24), Duration::from_micros(50_400));
        assert_eq!(m.feed_rows(10), Duration::from_micros(21_000));
        assert_eq!(m.barcode(50), Duration::from_millis(2_700));
        assert_eq!(m.bitmap_chunk(255), Duration::from_millis(7_650));
    }

    #[test]
    fn test_test_page_time() {
        let expected = Duration::from_millis(30 * 24 * 26) + Duration::from_micros(2_100 * 186);
        assert_eq!(model().test_page(), expected);
    }

    #[test]
    fn test_set_times() {
        let mut m = TimingModel::new(19200);
        m.set_times(10, 20);
        assert_eq!(m.dot_print_time, Duration::from_micros(10));
        assert_eq!(m.dot_feed_time, Duration::from_micros(20));
    }

    #[test]
    fn test_gate_is_monotonic() {
        let mut gate = Gate::new(false);
        gate.schedule(Duration::from_secs(10));
        let far = gate.resume_at();

        gate.schedule(Duration::from_millis(1));
        assert_eq!(gate.resume_at(), far);

        gate.schedule(Duration::ZERO);
        assert_eq!(gate.resume_at(), far);

        gate.schedule(Duration::from_secs(20));
        assert!(gate.resume_at() > far);
    }

    #[test]
    fn test_huge_dot_times_saturate() {
        let mut m = TimingModel::new(19200);
        m.set_times(u64::MAX, u64::MAX);
        assert_eq!(m.text_line(48, 255), Duration::MAX);
        assert_eq!(m.blank_line(24, 6), Duration::MAX);
        assert_eq!(m.test_page(), Duration::MAX);
        assert_eq!(m.bytes(usize::MAX), m.byte_time * u32::MAX);
    }

    #[test]
    fn test_gate_caps_busy_period() {
        let mut gate = Gate::new(false);
        gate.schedule(Duration::MAX);
        assert!(gate.remaining() <= MAX_BUSY);
        assert!(gate.remaining() > MAX_BUSY - Duration::from_secs(60));
    }

    #[test]
    fn test_unpaced_gate_never_sleeps() {
        let mut gate = Gate::new(false);
        gate.schedule(Duration::from_secs(3600));
        let start = Instant::now();
        gate.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(gate.remaining() > Duration::from_secs(3000));
    }

    #[test]
    fn test_paced_gate_sleeps_until_deadline() {
        let mut gate = Gate::new(true);
        gate.schedule(Duration::from_millis(30));
        gate.wait();
        assert!(Instant::now() >= gate.resume_at());
        assert_eq!(gate.remaining(), Duration::ZERO);
    }
}
