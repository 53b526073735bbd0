//! Pure date arithmetic for session ranges.
//!
//! All functions take `today` as a parameter so callers control the clock.

use chrono::NaiveDate;

/// Whether two inclusive date ranges overlap.
///
/// Boundary-inclusive on both ends: ranges that merely touch (one ends the
/// day the other starts) count as overlapping. Also covers full containment.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Days from `today` until `end`, negative once the range is past.
pub fn days_remaining(end: NaiveDate, today: NaiveDate) -> i64 {
    (end - today).num_days()
}

/// Elapsed share of the range as a percentage, clamped to [0, 100].
///
/// A range with zero or negative span reports 0.
pub fn elapsed_percent(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> f64 {
    let span = (end - start).num_days();
    if span <= 0 {
        return 0.0;
    }
    let elapsed = (today - start).num_days();
    (elapsed as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
}
