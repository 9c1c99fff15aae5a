//! Detection options and partial updates.

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::MINUTES_PER_DAY;

/// Which checks run during analysis, and their thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    /// Enforce per-slot buffers and the minimum break between services.
    pub include_buffer_time: bool,
    /// Report slots that overlap an observance window.
    pub respect_prayer_times: bool,
    /// Offer shrinking a buffer as a remediation for buffer violations.
    pub allow_flexible_breaks: bool,
    /// Longest allowed span of the working day, in hours.
    pub max_working_hours: f64,
    /// Minimum gap between two consecutive services, in minutes.
    pub min_break_between_services: i64,
    /// Reserved. Carried through but not consumed by any rule.
    pub consider_customer_preferences: bool,
    /// IANA timezone defining the provider's local day.
    pub timezone: String,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            include_buffer_time: true,
            respect_prayer_times: true,
            allow_flexible_breaks: true,
            max_working_hours: 12.0,
            min_break_between_services: 5,
            consider_customer_preferences: true,
            timezone: "UTC".to_string(),
        }
    }
}

/// A partial [`DetectionOptions`]: only the fields that are `Some` change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsPatch {
    pub include_buffer_time: Option<bool>,
    pub respect_prayer_times: Option<bool>,
    pub allow_flexible_breaks: Option<bool>,
    pub max_working_hours: Option<f64>,
    pub min_break_between_services: Option<i64>,
    pub consider_customer_preferences: Option<bool>,
    pub timezone: Option<String>,
}

impl DetectionOptions {
    /// Overwrite the fields present in `patch`, keeping the rest.
    pub fn merge(&mut self, patch: &OptionsPatch) {
        if let Some(v) = patch.include_buffer_time {
            self.include_buffer_time = v;
        }
        if let Some(v) = patch.respect_prayer_times {
            self.respect_prayer_times = v;
        }
        if let Some(v) = patch.allow_flexible_breaks {
            self.allow_flexible_breaks = v;
        }
        if let Some(v) = patch.max_working_hours {
            self.max_working_hours = v;
        }
        if let Some(v) = patch.min_break_between_services {
            self.min_break_between_services = v;
        }
        if let Some(v) = patch.consider_customer_preferences {
            self.consider_customer_preferences = v;
        }
        if let Some(v) = &patch.timezone {
            self.timezone = v.clone();
        }
    }

    /// Copy of these options with `patch` applied.
    pub fn merged(&self, patch: &OptionsPatch) -> Self {
        let mut next = self.clone();
        next.merge(patch);
        next
    }

    /// Check thresholds and resolve the timezone.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOptions`] for a non-positive or non-finite
    /// `max_working_hours` or a `min_break_between_services` outside one day, and
    /// [`EngineError::InvalidTimezone`] if `timezone` is not an IANA name.
    pub fn validate(&self) -> Result<Tz> {
        if !self.max_working_hours.is_finite() || self.max_working_hours <= 0.0 {
            return Err(EngineError::InvalidOptions(format!(
                "max_working_hours must be positive, got {}",
                self.max_working_hours
            )));
        }
        if !(0..=MINUTES_PER_DAY).contains(&self.min_break_between_services) {
            return Err(EngineError::InvalidOptions(format!(
                "min_break_between_services must be within 0-{MINUTES_PER_DAY}, got {}",
                self.min_break_between_services
            )));
        }
        parse_timezone(&self.timezone)
    }

    /// Whether a working span is longer than allowed, to the second.
    pub fn exceeds_working_hours(&self, span: Duration) -> bool {
        span.num_seconds() as f64 > self.max_working_hours * 3600.0
    }
}

/// Parse an IANA timezone string into `Tz`.
pub(crate) fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone(format!("'{}'", s)))
}
