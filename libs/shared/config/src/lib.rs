use std::env;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Raw clinic schedule settings as read from the settings store.
///
/// Values are kept as strings here; `availability-cell` parses and
/// validates them into a `TimeConfiguration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub working_hours_start: String,
    pub working_hours_end: String,
    pub lunch_break_start: String,
    pub lunch_break_end: String,
    pub appointment_duration: String,
    pub appointment_interval: String,
    pub working_days: Vec<String>,
    pub utc_offset_minutes: String,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            working_hours_start: "08:00".to_string(),
            working_hours_end: "18:00".to_string(),
            lunch_break_start: "12:00".to_string(),
            lunch_break_end: "13:00".to_string(),
            appointment_duration: "60".to_string(),
            appointment_interval: "30".to_string(),
            working_days: ["monday", "tuesday", "wednesday", "thursday", "friday"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            utc_offset_minutes: "0".to_string(),
        }
    }
}

impl ScheduleSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            working_hours_start: env_or("CLINIC_WORKING_HOURS_START", defaults.working_hours_start),
            working_hours_end: env_or("CLINIC_WORKING_HOURS_END", defaults.working_hours_end),
            lunch_break_start: env_or("CLINIC_LUNCH_BREAK_START", defaults.lunch_break_start),
            lunch_break_end: env_or("CLINIC_LUNCH_BREAK_END", defaults.lunch_break_end),
            appointment_duration: env_or("CLINIC_APPOINTMENT_DURATION", defaults.appointment_duration),
            appointment_interval: env_or("CLINIC_APPOINTMENT_INTERVAL", defaults.appointment_interval),
            working_days: match env::var("CLINIC_WORKING_DAYS") {
                Ok(days) => days
                    .split(',')
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty())
                    .collect(),
                Err(_) => {
                    warn!("CLINIC_WORKING_DAYS not set, using default");
                    defaults.working_days
                }
            },
            utc_offset_minutes: env_or("CLINIC_UTC_OFFSET_MINUTES", defaults.utc_offset_minutes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub schedule: ScheduleSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            schedule: ScheduleSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let server_port = match env::var("SERVER_PORT") {
            Ok(port) => port.parse().unwrap_or_else(|_| {
                warn!("SERVER_PORT is not a valid port ({}), using default", port);
                3000
            }),
            Err(_) => {
                warn!("SERVER_PORT not set, using default");
                3000
            }
        };

        Self {
            server_host: env_or("SERVER_HOST", "0.0.0.0".to_string()),
            server_port,
            schedule: ScheduleSettings::from_env(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or_else(|_| {
        warn!("{} not set, using default {}", key, default);
        default
    })
}
