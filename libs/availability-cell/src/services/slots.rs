use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use tracing::{debug, warn};

use crate::models::TimeConfiguration;

/// Candidate start times for `date`, from the start of working hours up to
/// (excluding) their end, one every `appointment_interval` minutes.
///
/// Non-working days produce no candidates, and neither does a configuration
/// with a zero interval.
pub fn generate_slot_times(date: NaiveDate, config: &TimeConfiguration) -> Vec<NaiveTime> {
    if !config.is_working_day(date.weekday()) {
        debug!("{} ({:?}) is not a working day", date, date.weekday());
        return Vec::new();
    }

    if config.appointment_interval == 0 {
        warn!("Appointment interval is zero, no slots generated for {}", date);
        return Vec::new();
    }

    let start = minutes_since_midnight(config.working_hours_start);
    let end = minutes_since_midnight(config.working_hours_end);
    let step = config.appointment_interval as usize;

    (start..end)
        .step_by(step)
        .filter_map(|minute| NaiveTime::from_hms_opt(minute / 60, minute % 60, 0))
        .collect()
}

pub(crate) fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
