use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::Serialize;

/// Closed interval `[start, end]` at millisecond precision.
///
/// Windows are compared inclusively: two windows that share only an endpoint
/// still overlap, so back-to-back bookings of the same resource conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    #[serde(rename = "start_date")]
    start: DateTime<Utc>,
    #[serde(rename = "end_date")]
    end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("window start {start} is after its end {end}")]
pub struct InvalidWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, truncating both ends to whole milliseconds (the storage precision).
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidWindow> {
        let start = truncate_to_millis(start);
        let end = truncate_to_millis(end);
        if start > end {
            return Err(InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Rebuild a window from stored unix milliseconds.
    pub fn from_millis(start_ms: i64, end_ms: i64) -> Option<Self> {
        let start = Utc.timestamp_millis_opt(start_ms).single()?;
        let end = Utc.timestamp_millis_opt(end_ms).single()?;
        Self::new(start, end).ok()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        overlaps(self, other)
    }
}

/// `a` and `b` share at least one instant.
pub fn overlaps(a: &TimeWindow, b: &TimeWindow) -> bool {
    a.start <= b.end && a.end >= b.start
}

/// Anything occupying a resource for a window.
pub trait Booked {
    fn window(&self) -> &TimeWindow;
}

/// First booking (in iteration order) whose window overlaps `candidate`.
pub fn first_conflict<'a, T, I>(candidate: &TimeWindow, bookings: I) -> Option<&'a T>
where
    T: Booked + 'a,
    I: IntoIterator<Item = &'a T>,
{
    bookings
        .into_iter()
        .find(|booking| overlaps(candidate, booking.window()))
}

fn truncate_to_millis(t: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = t.nanosecond();
    t.with_nanosecond(nanos - nanos % 1_000_000).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn w(start: i64, end: i64) -> TimeWindow {
        TimeWindow::new(at(start), at(end)).unwrap()
    }

    struct Slot(&'static str, TimeWindow);

    impl Booked for Slot {
        fn window(&self) -> &TimeWindow {
            &self.1
        }
    }

    #[test]
    fn touching_endpoints_conflict() {
        assert!(overlaps(&w(1, 5), &w(5, 10)));
        assert!(overlaps(&w(5, 10), &w(1, 5)));
    }

    #[test]
    fn adjacent_windows_do_not_conflict() {
        assert!(!overlaps(&w(1, 5), &w(6, 10)));
        assert!(!overlaps(&w(6, 10), &w(1, 5)));
    }

    #[test]
    fn window_overlaps_itself() {
        for win in [w(0, 0), w(1, 5), w(-100, 100)] {
            assert!(win.overlaps(&win));
        }
    }

    #[test]
    fn overlap_is_symmetric() {
        let samples = [
            w(0, 0),
            w(0, 10),
            w(3, 3),
            w(5, 15),
            w(10, 20),
            w(11, 12),
            w(20, 30),
            w(-5, -1),
        ];
        for a in &samples {
            for b in &samples {
                assert_eq!(overlaps(a, b), overlaps(b, a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn zero_length_window_is_an_instant() {
        let instant = w(5, 5);
        assert!(overlaps(&instant, &w(1, 5)));
        assert!(overlaps(&instant, &w(5, 9)));
        assert!(overlaps(&instant, &w(0, 10)));
        assert!(!overlaps(&instant, &w(6, 9)));
        assert!(!overlaps(&instant, &w(4, 4)));
    }

    #[test]
    fn containment_counts_as_overlap() {
        assert!(overlaps(&w(0, 100), &w(40, 60)));
        assert!(overlaps(&w(40, 60), &w(0, 100)));
    }

    #[test]
    fn new_rejects_inverted_window() {
        let err = TimeWindow::new(at(10), at(5)).unwrap_err();
        assert_eq!(err.start, at(10));
        assert_eq!(err.end, at(5));
    }

    #[test]
    fn new_truncates_to_millis() {
        let start = at(1_000).with_nanosecond(1_500_999).unwrap();
        let win = TimeWindow::new(start, start).unwrap();
        assert_eq!(win.start_ms(), 1_001);
        assert_eq!(win.start(), win.end());
    }

    #[test]
    fn from_millis_keeps_invariant() {
        assert_eq!(TimeWindow::from_millis(10, 20), Some(w(10, 20)));
        assert_eq!(TimeWindow::from_millis(20, 10), None);
    }

    #[test]
    fn first_conflict_returns_first_in_order() {
        let slots = [
            Slot("early", w(0, 4)),
            Slot("second", w(8, 12)),
            Slot("third", w(10, 14)),
        ];
        let hit = first_conflict(&w(9, 11), &slots).unwrap();
        assert_eq!(hit.0, "second");
        assert!(first_conflict(&w(5, 7), &slots).is_none());
    }

    #[test]
    fn first_conflict_on_empty_set_is_none() {
        let slots: Vec<Slot> = Vec::new();
        assert!(first_conflict(&w(0, 10), &slots).is_none());
    }

    #[test]
    fn serializes_with_api_field_names() {
        let json = serde_json::to_value(w(0, 1_000)).unwrap();
        assert_eq!(json["start_date"], "1970-01-01T00:00:00Z");
        assert_eq!(json["end_date"], "1970-01-01T00:00:01Z");
    }
}
