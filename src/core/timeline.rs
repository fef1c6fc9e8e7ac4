use chrono::{Days, NaiveDate};

use crate::models::{TimelineOverlap, Trip};

/// Widen an inclusive date range by `flexibility_days` on both ends
///
/// Saturates at the edges of the representable calendar.
#[inline]
pub fn flexed_range(
    start: NaiveDate,
    end: NaiveDate,
    flexibility_days: u32,
) -> (NaiveDate, NaiveDate) {
    let flex = Days::new(u64::from(flexibility_days));
    (
        start.checked_sub_days(flex).unwrap_or(NaiveDate::MIN),
        end.checked_add_days(flex).unwrap_or(NaiveDate::MAX),
    )
}

/// Inclusive day count between two dates, zero when `end` precedes `start`
#[inline]
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        0
    } else {
        (end - start).num_days() + 1
    }
}

/// Calculate how much two trips overlap once both are widened by the
/// flexibility window
///
/// The percentage is the widened overlap divided by the combined span of the
/// two unwidened trips, capped at 1. A zero overlap means the pair is not
/// date-plausible and should not be scored further.
pub fn calculate_timeline_overlap(
    trip1: &Trip,
    trip2: &Trip,
    flexibility_days: u32,
) -> TimelineOverlap {
    let (flex_start1, flex_end1) =
        flexed_range(trip1.start_date, trip1.end_date, flexibility_days);
    let (flex_start2, flex_end2) =
        flexed_range(trip2.start_date, trip2.end_date, flexibility_days);

    let overlap_start = flex_start1.max(flex_start2);
    let overlap_end = flex_end1.min(flex_end2);
    let overlap_days = inclusive_days(overlap_start, overlap_end);

    let total_days = inclusive_days(
        trip1.start_date.min(trip2.start_date),
        trip1.end_date.max(trip2.end_date),
    );

    let overlap_percentage = if overlap_days > 0 && total_days > 0 {
        (overlap_days as f64 / total_days as f64).min(1.0)
    } else {
        0.0
    };

    TimelineOverlap {
        overlap_days: u32::try_from(overlap_days).unwrap_or(u32::MAX),
        overlap_percentage,
        overlap_start,
        overlap_end,
        flexibility_used: flexibility_days,
    }
}
