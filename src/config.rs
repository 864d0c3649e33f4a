use std::collections::HashMap;
use std::fs;

use chrono_tz::Tz;

use crate::error::EventsError;

pub const DEFAULT_CITY: &str = "Las Vegas";
pub const DEFAULT_STATE_CODE: &str = "NV";
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!("Invalid config line {}: {}", idx + 1, line));
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Fixed per-process venue settings: which city the bot answers for and the
/// timezone every date computation runs in. Built once at startup; the only
/// place a configuration failure is allowed to stop the program.
#[derive(Debug, Clone)]
pub struct VenueConfig {
    pub api_key: String,
    pub city: String,
    pub state_code: String,
    pub timezone: Tz,
}

impl VenueConfig {
    pub fn from_settings(get: impl Fn(&str) -> Option<String>) -> Result<Self, EventsError> {
        let api_key = get("TICKETMASTER_API_KEY")
            .ok_or(EventsError::MissingConfig("TICKETMASTER_API_KEY"))?;
        let city = get("EVENTS_CITY").unwrap_or_else(|| DEFAULT_CITY.to_string());
        let state_code = get("EVENTS_STATE_CODE").unwrap_or_else(|| DEFAULT_STATE_CODE.to_string());
        let tz_name = get("EVENTS_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = tz_name.parse::<Tz>().map_err(|e| EventsError::InvalidConfig {
            key: "EVENTS_TIMEZONE",
            reason: e.to_string(),
        })?;
        Ok(Self {
            api_key,
            city,
            state_code,
            timezone,
        })
    }
}
