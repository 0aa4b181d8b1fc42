use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{ExistingSession, TimeConfiguration, UnavailableReason};

/// Decides whether a candidate start time can be offered.
///
/// Lunch is checked first and wins over any session conflict.
pub fn check_slot(
    date: NaiveDate,
    start: NaiveTime,
    config: &TimeConfiguration,
    sessions: &[ExistingSession],
    clinic_offset: FixedOffset,
) -> Option<UnavailableReason> {
    if is_during_lunch(start, config) {
        return Some(UnavailableReason::LunchBreak);
    }

    let slot_start = date.and_time(start);
    let slot_end = slot_start + Duration::minutes(i64::from(config.appointment_duration));

    let occupied = sessions.iter().any(|session| {
        let (session_start, session_end) = session_interval(session, clinic_offset);

        // Sessions from other calendar days are never compared.
        session_start.date() == date && intervals_overlap(slot_start, slot_end, session_start, session_end)
    });

    if occupied {
        Some(UnavailableReason::SlotOccupied)
    } else {
        None
    }
}

pub fn is_during_lunch(start: NaiveTime, config: &TimeConfiguration) -> bool {
    start >= config.lunch_break_start && start < config.lunch_break_end
}

/// Half-open overlap between `[slot_start, slot_end)` and
/// `[session_start, session_end)`.
pub fn intervals_overlap(
    slot_start: NaiveDateTime,
    slot_end: NaiveDateTime,
    session_start: NaiveDateTime,
    session_end: NaiveDateTime,
) -> bool {
    let starts_inside = slot_start >= session_start && slot_start < session_end;
    let ends_inside = slot_end > session_start && slot_end <= session_end;
    let contains = slot_start <= session_start && slot_end >= session_end;

    starts_inside || ends_inside || contains
}

/// Session interval on the clinic wall clock.
pub fn session_interval(session: &ExistingSession, clinic_offset: FixedOffset) -> (NaiveDateTime, NaiveDateTime) {
    let start = session.scheduled_at.with_timezone(&clinic_offset).naive_local();
    let end = start + Duration::minutes(i64::from(session.duration_minutes));
    (start, end)
}
