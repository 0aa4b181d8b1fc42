use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use shared_config::ScheduleSettings;
use shared_models::error::AppError;

/// Longest clinic offset accepted from UTC, exclusive (one full day).
const MAX_UTC_OFFSET_MINUTES: u32 = 24 * 60;

/// Clinic operating hours used to lay out a day of appointment slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConfiguration {
    #[serde(with = "clock_time")]
    pub working_hours_start: NaiveTime,
    #[serde(with = "clock_time")]
    pub working_hours_end: NaiveTime,
    #[serde(with = "clock_time")]
    pub lunch_break_start: NaiveTime,
    #[serde(with = "clock_time")]
    pub lunch_break_end: NaiveTime,
    /// Length of a new appointment, in minutes.
    pub appointment_duration: u32,
    /// Distance between two consecutive slot start times, in minutes.
    pub appointment_interval: u32,
    #[serde(with = "weekday_names")]
    pub working_days: HashSet<Weekday>,
    /// Clinic wall clock relative to UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl TimeConfiguration {
    pub fn validate(&self) -> Result<(), AvailabilityError> {
        if self.working_hours_start >= self.working_hours_end {
            return Err(AvailabilityError::InvalidConfiguration(
                "Working hours must start before they end".to_string(),
            ));
        }

        if self.lunch_break_start > self.lunch_break_end {
            return Err(AvailabilityError::InvalidConfiguration(
                "Lunch break cannot end before it starts".to_string(),
            ));
        }

        if self.appointment_interval == 0 {
            return Err(AvailabilityError::InvalidConfiguration(
                "Appointment interval must be greater than zero".to_string(),
            ));
        }

        if self.appointment_duration == 0 {
            return Err(AvailabilityError::InvalidConfiguration(
                "Appointment duration must be greater than zero".to_string(),
            ));
        }

        if self.utc_offset_minutes.unsigned_abs() >= MAX_UTC_OFFSET_MINUTES {
            return Err(AvailabilityError::InvalidConfiguration(format!(
                "UTC offset of {} minutes is out of range",
                self.utc_offset_minutes
            )));
        }

        Ok(())
    }

    pub fn is_working_day(&self, weekday: Weekday) -> bool {
        self.working_days.contains(&weekday)
    }
}

impl TryFrom<&ScheduleSettings> for TimeConfiguration {
    type Error = AvailabilityError;

    fn try_from(settings: &ScheduleSettings) -> Result<Self, Self::Error> {
        let working_days = settings
            .working_days
            .iter()
            .map(|day| parse_weekday(day))
            .collect::<Result<HashSet<_>, _>>()?;

        let config = Self {
            working_hours_start: parse_clock_time(&settings.working_hours_start)?,
            working_hours_end: parse_clock_time(&settings.working_hours_end)?,
            lunch_break_start: parse_clock_time(&settings.lunch_break_start)?,
            lunch_break_end: parse_clock_time(&settings.lunch_break_end)?,
            appointment_duration: parse_number("appointment_duration", &settings.appointment_duration)?,
            appointment_interval: parse_number("appointment_interval", &settings.appointment_interval)?,
            working_days,
            utc_offset_minutes: parse_number("utc_offset_minutes", &settings.utc_offset_minutes)?,
        };

        config.validate()?;
        Ok(config)
    }
}

/// A session already booked on the clinic calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingSession {
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl ExistingSession {
    pub fn validate(&self) -> Result<(), AvailabilityError> {
        if self.duration_minutes == 0 {
            return Err(AvailabilityError::InvalidSession(format!(
                "session at {} must last at least one minute",
                self.scheduled_at.to_rfc3339()
            )));
        }

        Ok(())
    }
}

/// Rejects the first malformed session in `sessions`.
pub fn validate_sessions(sessions: &[ExistingSession]) -> Result<(), AvailabilityError> {
    sessions.iter().try_for_each(ExistingSession::validate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnavailableReason {
    #[serde(rename = "lunch break")]
    LunchBreak,
    #[serde(rename = "slot occupied")]
    SlotOccupied,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::LunchBreak => write!(f, "lunch break"),
            UnavailableReason::SlotOccupied => write!(f, "slot occupied"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
}

impl TimeSlot {
    pub fn available(time: NaiveTime) -> Self {
        Self { time, available: true, reason: None }
    }

    pub fn unavailable(time: NaiveTime, reason: UnavailableReason) -> Self {
        Self { time, available: false, reason: Some(reason) }
    }

    /// Zero-padded "HH:MM" label.
    pub fn label(&self) -> String {
        format_clock_time(self.time)
    }
}

/// Every slot of a day together with the size of each group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
    pub available_count: usize,
    pub unavailable_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Invalid time '{0}': expected zero-padded HH:MM")]
    InvalidTimeFormat(String),

    #[error("Invalid weekday name '{0}'")]
    InvalidWeekday(String),

    #[error("Invalid value for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("{time} is not an offered slot on {date}")]
    SlotNotOffered { date: NaiveDate, time: String },

    #[error("{time} is unavailable: {reason}")]
    SlotUnavailable { time: String, reason: UnavailableReason },
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::SlotNotOffered { .. } | AvailabilityError::SlotUnavailable { .. } => {
                AppError::Conflict(err.to_string())
            }
            _ => AppError::ValidationError(err.to_string()),
        }
    }
}

/// Parses a strict, zero-padded "HH:MM" time of day.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, AvailabilityError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit());

    if !well_formed {
        return Err(AvailabilityError::InvalidTimeFormat(value.to_string()));
    }

    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AvailabilityError::InvalidTimeFormat(value.to_string()))
}

pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parses a full English weekday name, ignoring case and surrounding whitespace.
pub fn parse_weekday(value: &str) -> Result<Weekday, AvailabilityError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "monday" => Ok(Weekday::Mon),
        "tuesday" => Ok(Weekday::Tue),
        "wednesday" => Ok(Weekday::Wed),
        "thursday" => Ok(Weekday::Thu),
        "friday" => Ok(Weekday::Fri),
        "saturday" => Ok(Weekday::Sat),
        "sunday" => Ok(Weekday::Sun),
        _ => Err(AvailabilityError::InvalidWeekday(value.to_string())),
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, AvailabilityError> {
    value.trim().parse().map_err(|_| AvailabilityError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

mod clock_time {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_clock_time(&raw).map_err(D::Error::custom)
    }
}

mod weekday_names {
    use std::collections::HashSet;

    use chrono::Weekday;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(days: &HashSet<Weekday>, serializer: S) -> Result<S::Ok, S::Error> {
        let mut ordered: Vec<&Weekday> = days.iter().collect();
        ordered.sort_by_key(|d| d.num_days_from_monday());
        serializer.collect_seq(ordered.into_iter().map(|d| super::weekday_name(*d)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HashSet<Weekday>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|name| super::parse_weekday(name).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_clock_time_requires_zero_padding() {
        assert_eq!(parse_clock_time("08:05").unwrap(), NaiveTime::from_hms_opt(8, 5, 0).unwrap());
        assert_matches!(parse_clock_time("8:05"), Err(AvailabilityError::InvalidTimeFormat(_)));
        assert_matches!(parse_clock_time("08:05:00"), Err(AvailabilityError::InvalidTimeFormat(_)));
        assert_matches!(parse_clock_time("24:00"), Err(AvailabilityError::InvalidTimeFormat(_)));
        assert_matches!(parse_clock_time("ab:cd"), Err(AvailabilityError::InvalidTimeFormat(_)));
    }

    #[test]
    fn test_parse_weekday_is_case_insensitive() {
        assert_eq!(parse_weekday("Monday").unwrap(), Weekday::Mon);
        assert_eq!(parse_weekday(" SUNDAY ").unwrap(), Weekday::Sun);
        assert_matches!(parse_weekday("mon"), Err(AvailabilityError::InvalidWeekday(_)));
    }

    #[test]
    fn test_default_settings_convert_to_valid_configuration() {
        let config = TimeConfiguration::try_from(&ScheduleSettings::default()).unwrap();

        assert_eq!(config.appointment_duration, 60);
        assert_eq!(config.appointment_interval, 30);
        assert!(config.is_working_day(Weekday::Fri));
        assert!(!config.is_working_day(Weekday::Sat));
    }

    #[test]
    fn test_settings_with_bad_values_fail_fast() {
        let mut settings = ScheduleSettings::default();
        settings.lunch_break_end = "1pm".to_string();
        assert_matches!(
            TimeConfiguration::try_from(&settings),
            Err(AvailabilityError::InvalidTimeFormat(value)) if value == "1pm"
        );

        let mut settings = ScheduleSettings::default();
        settings.appointment_interval = "fifteen".to_string();
        assert_matches!(
            TimeConfiguration::try_from(&settings),
            Err(AvailabilityError::InvalidNumber { field: "appointment_interval", .. })
        );

        let mut settings = ScheduleSettings::default();
        settings.working_days.push("funday".to_string());
        assert_matches!(TimeConfiguration::try_from(&settings), Err(AvailabilityError::InvalidWeekday(_)));
    }

    #[test]
    fn test_validate_rejects_broken_invariants() {
        let valid = TimeConfiguration::try_from(&ScheduleSettings::default()).unwrap();

        let mut inverted = valid.clone();
        inverted.working_hours_end = inverted.working_hours_start;
        assert_matches!(inverted.validate(), Err(AvailabilityError::InvalidConfiguration(_)));

        let mut lunch = valid.clone();
        lunch.lunch_break_start = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        assert_matches!(lunch.validate(), Err(AvailabilityError::InvalidConfiguration(_)));

        let mut no_interval = valid.clone();
        no_interval.appointment_interval = 0;
        assert_matches!(no_interval.validate(), Err(AvailabilityError::InvalidConfiguration(_)));

        let mut offset = valid;
        offset.utc_offset_minutes = 24 * 60;
        assert_matches!(offset.validate(), Err(AvailabilityError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_validate_rejects_extreme_utc_offsets() {
        let mut config = TimeConfiguration::try_from(&ScheduleSettings::default()).unwrap();

        for minutes in [i32::MIN, i32::MAX, -24 * 60] {
            config.utc_offset_minutes = minutes;
            assert_matches!(config.validate(), Err(AvailabilityError::InvalidConfiguration(_)));
        }

        for minutes in [-(24 * 60 - 1), -330, 0, 24 * 60 - 1] {
            config.utc_offset_minutes = minutes;
            assert!(config.validate().is_ok(), "{} should be accepted", minutes);
        }

        let mut settings = ScheduleSettings::default();
        settings.utc_offset_minutes = i32::MIN.to_string();
        assert_matches!(
            TimeConfiguration::try_from(&settings),
            Err(AvailabilityError::InvalidConfiguration(_))
        );
    }

    #[test]
    fn test_zero_length_session_is_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let empty = ExistingSession { scheduled_at: start, duration_minutes: 0 };
        let booked = ExistingSession { scheduled_at: start, duration_minutes: 30 };

        assert!(booked.validate().is_ok());
        assert_matches!(empty.validate(), Err(AvailabilityError::InvalidSession(_)));
        assert_matches!(
            validate_sessions(&[booked, empty]),
            Err(AvailabilityError::InvalidSession(msg)) if msg.contains("2024-01-01T09:00:00")
        );
        assert!(validate_sessions(&[]).is_ok());
    }

    #[test]
    fn test_configuration_json_shape() {
        let config: TimeConfiguration = serde_json::from_value(json!({
            "working_hours_start": "09:00",
            "working_hours_end": "17:00",
            "lunch_break_start": "12:30",
            "lunch_break_end": "13:30",
            "appointment_duration": 45,
            "appointment_interval": 15,
            "working_days": ["friday", "Monday"]
        }))
        .unwrap();

        assert_eq!(config.utc_offset_minutes, 0);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["working_days"], json!(["monday", "friday"]));
        assert_eq!(value["lunch_break_start"], "12:30");
    }

    #[test]
    fn test_time_slot_serializes_reason_text() {
        let slot = TimeSlot::unavailable(NaiveTime::from_hms_opt(12, 0, 0).unwrap(), UnavailableReason::LunchBreak);
        assert_eq!(
            serde_json::to_value(&slot).unwrap(),
            json!({ "time": "12:00", "available": false, "reason": "lunch break" })
        );

        let open = TimeSlot::available(NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(serde_json::to_value(&open).unwrap(), json!({ "time": "09:30", "available": true }));
        assert_eq!(open.label(), "09:30");
    }

    #[test]
    fn test_slot_errors_map_to_conflict() {
        let err = AvailabilityError::SlotUnavailable {
            time: "09:00".to_string(),
            reason: UnavailableReason::SlotOccupied,
        };
        assert_matches!(AppError::from(err), AppError::Conflict(msg) if msg == "09:00 is unavailable: slot occupied");

        let err = AvailabilityError::InvalidTimeFormat("9".to_string());
        assert_matches!(AppError::from(err), AppError::ValidationError(_));
    }
}
