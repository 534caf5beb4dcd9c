// Calendar-date inclusion test shared by the pull and push paths

use chrono::NaiveDate;

/// Decide whether an event overlaps the target date.
///
/// An absent end date marks a single-day event, matched by start-date
/// equality; otherwise the target must fall inside the inclusive
/// `[start, end]` interval. Time of day never participates. An absent
/// start date never matches; callers drop such records silently.
pub fn matches(target: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    let Some(start) = start else {
        return false;
    };
    match end {
        None => start == target,
        Some(end) => start <= target && target <= end,
    }
}
