use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::models::{
    format_clock_time, AvailabilityError, DayAvailability, ExistingSession, TimeConfiguration, TimeSlot,
};
use crate::services::conflict::check_slot;
use crate::services::slots::{generate_slot_times, minutes_since_midnight};

/// Computes bookable slots for a clinic from a validated configuration.
///
/// Holds no state beyond the configuration snapshot it was built with, so
/// every call is a pure function of its arguments.
#[derive(Debug, Clone)]
pub struct AvailabilityService<'a> {
    config: &'a TimeConfiguration,
    clinic_offset: FixedOffset,
}

impl<'a> AvailabilityService<'a> {
    pub fn new(config: &'a TimeConfiguration) -> Result<Self, AvailabilityError> {
        config.validate()?;

        let clinic_offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AvailabilityError::InvalidConfiguration(format!(
                    "UTC offset of {} minutes is out of range",
                    config.utc_offset_minutes
                ))
            })?;

        Ok(Self { config, clinic_offset })
    }

    /// All slots of the day, available or not, in ascending order.
    pub fn list_all_slots(&self, date: NaiveDate, sessions: &[ExistingSession]) -> Vec<TimeSlot> {
        let slots: Vec<TimeSlot> = generate_slot_times(date, self.config)
            .into_iter()
            .map(|time| match check_slot(date, time, self.config, sessions, self.clinic_offset) {
                Some(reason) => TimeSlot::unavailable(time, reason),
                None => TimeSlot::available(time),
            })
            .collect();

        debug!(
            "Generated {} slots for {} against {} existing sessions",
            slots.len(),
            date,
            sessions.len()
        );

        slots
    }

    pub fn list_available_slots(&self, date: NaiveDate, sessions: &[ExistingSession]) -> Vec<TimeSlot> {
        self.list_all_slots(date, sessions)
            .into_iter()
            .filter(|slot| slot.available)
            .collect()
    }

    pub fn day_availability(&self, date: NaiveDate, sessions: &[ExistingSession]) -> DayAvailability {
        let slots = self.list_all_slots(date, sessions);
        let available_count = slots.iter().filter(|slot| slot.available).count();

        DayAvailability {
            date,
            unavailable_count: slots.len() - available_count,
            available_count,
            slots,
        }
    }

    /// First bookable slot of `date`.
    ///
    /// When `date` is today on the clinic calendar only slots strictly after
    /// the current minute qualify; any other date is taken as a whole.
    pub fn next_available_slot(
        &self,
        date: NaiveDate,
        sessions: &[ExistingSession],
        now: DateTime<Utc>,
    ) -> Option<TimeSlot> {
        let local_now = now.with_timezone(&self.clinic_offset).naive_local();
        let mut available = self.list_available_slots(date, sessions).into_iter();

        let next = if date == local_now.date() {
            let current_minute = minutes_since_midnight(local_now.time());
            available.find(|slot| minutes_since_midnight(slot.time) > current_minute)
        } else {
            available.next()
        };

        if next.is_none() {
            debug!("No available slot left on {}", date);
        }

        next
    }

    /// Checks that `time` is an offered and free slot on `date` before a
    /// booking is persisted.
    pub fn validate_requested_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        sessions: &[ExistingSession],
    ) -> Result<TimeSlot, AvailabilityError> {
        let label = format_clock_time(time);

        let slot = self
            .list_all_slots(date, sessions)
            .into_iter()
            .find(|slot| slot.time == time)
            .ok_or_else(|| AvailabilityError::SlotNotOffered { date, time: label.clone() })?;

        match slot.reason {
            Some(reason) => Err(AvailabilityError::SlotUnavailable { time: label, reason }),
            None => Ok(slot),
        }
    }
}
