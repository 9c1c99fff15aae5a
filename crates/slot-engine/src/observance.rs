//! Daily observance windows.
//!
//! The engine does not compute observance times. It asks an
//! [`ObservanceProvider`] for the windows on a given local date, so that
//! location- or date-dependent tables can be plugged in without touching
//! detection. [`ObservanceTable`] is the fixed-clock-time default.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::{Window, MINUTES_PER_DAY};

pub const DEFAULT_OBSERVANCE_MINUTES: i64 = 15;

/// One observance on one local date, in wall-clock terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservanceWindow {
    pub name: String,
    pub start: NaiveTime,
    pub duration_minutes: i64,
}

impl ObservanceWindow {
    /// Place the window on `date` in `tz` and convert it to UTC.
    ///
    /// Returns `None` when the local start time does not exist on that date
    /// (DST gap) or the duration is outside `0..=1440` minutes. Ambiguous
    /// local times resolve to the earlier instant.
    pub fn locate(&self, date: NaiveDate, tz: &Tz) -> Option<Window> {
        if !(0..=MINUTES_PER_DAY).contains(&self.duration_minutes) {
            return None;
        }
        let naive = date.and_time(self.start);
        let start: DateTime<Utc> = tz
            .from_local_datetime(&naive)
            .earliest()?
            .with_timezone(&Utc);
        let end = start.checked_add_signed(Duration::try_minutes(self.duration_minutes)?)?;
        Some(Window::new(start, end))
    }
}

/// Source of observance windows for a local date.
pub trait ObservanceProvider {
    /// Windows falling on `date`, sorted by start time.
    fn windows_on(&self, date: NaiveDate) -> Vec<ObservanceWindow>;
}

/// A single table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservanceEntry {
    pub time: NaiveTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    /// Overrides `duration_minutes` on Fridays when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friday_duration_minutes: Option<i64>,
}

fn default_duration() -> i64 {
    DEFAULT_OBSERVANCE_MINUTES
}

impl ObservanceEntry {
    pub fn at(time: NaiveTime) -> Self {
        Self {
            time,
            duration_minutes: DEFAULT_OBSERVANCE_MINUTES,
            friday_duration_minutes: None,
        }
    }

    fn duration_on(&self, date: NaiveDate) -> i64 {
        match (date.weekday(), self.friday_duration_minutes) {
            (Weekday::Fri, Some(minutes)) => minutes,
            _ => self.duration_minutes,
        }
    }
}

/// Named daily clock times, each with its own duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservanceTable {
    entries: BTreeMap<String, ObservanceEntry>,
}

impl Default for ObservanceTable {
    fn default() -> Self {
        let defaults = [
            ("fajr", 5, 0),
            ("dhuhr", 12, 30),
            ("asr", 15, 45),
            ("maghrib", 18, 15),
            ("isha", 19, 45),
        ];
        let entries = defaults
            .into_iter()
            .filter_map(|(name, h, m)| {
                NaiveTime::from_hms_opt(h, m, 0).map(|t| (name.to_string(), ObservanceEntry::at(t)))
            })
            .collect();
        Self { entries }
    }
}

impl ObservanceTable {
    /// A table with no entries.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ObservanceEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObservanceEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge clock times into the table.
    ///
    /// Existing entries keep their durations; names not in `times` are left
    /// alone. New names get the default 15-minute window.
    pub fn update_times<I, K>(&mut self, times: I)
    where
        I: IntoIterator<Item = (K, NaiveTime)>,
        K: Into<String>,
    {
        for (name, time) in times {
            self.entries
                .entry(name.into())
                .and_modify(|e| e.time = time)
                .or_insert_with(|| ObservanceEntry::at(time));
        }
    }

    /// Set the window length for one entry. Returns `false` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOptions`] if `minutes` is outside `0..=1440`.
    pub fn set_duration(&mut self, name: &str, minutes: i64) -> Result<bool> {
        check_duration(name, minutes)?;
        Ok(match self.entries.get_mut(name) {
            Some(entry) => {
                entry.duration_minutes = minutes;
                true
            }
            None => false,
        })
    }

    /// Set a Friday-only window length for one entry. Returns `false` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOptions`] if `minutes` is outside `0..=1440`.
    pub fn set_friday_duration(&mut self, name: &str, minutes: Option<i64>) -> Result<bool> {
        if let Some(m) = minutes {
            check_duration(name, m)?;
        }
        Ok(match self.entries.get_mut(name) {
            Some(entry) => {
                entry.friday_duration_minutes = minutes;
                true
            }
            None => false,
        })
    }

    /// Remove an entry, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<ObservanceEntry> {
        self.entries.remove(name)
    }
}

fn check_duration(name: &str, minutes: i64) -> Result<()> {
    if (0..=MINUTES_PER_DAY).contains(&minutes) {
        Ok(())
    } else {
        Err(EngineError::InvalidOptions(format!(
            "observance '{name}' duration must be within 0-{MINUTES_PER_DAY} minutes, got {minutes}"
        )))
    }
}

impl ObservanceProvider for ObservanceTable {
    fn windows_on(&self, date: NaiveDate) -> Vec<ObservanceWindow> {
        let mut windows: Vec<ObservanceWindow> = self
            .entries
            .iter()
            .map(|(name, entry)| ObservanceWindow {
                name: name.clone(),
                start: entry.time,
                duration_minutes: entry.duration_on(date),
            })
            .collect();
        windows.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.name.cmp(&b.name)));
        windows
    }
}

impl<P: ObservanceProvider + ?Sized> ObservanceProvider for &P {
    fn windows_on(&self, date: NaiveDate) -> Vec<ObservanceWindow> {
        (**self).windows_on(date)
    }
}

/// Parse a clock time: `"12:30"` or `"12:30:00"`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidClockTime`] for anything else.
pub fn parse_clock_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| EngineError::InvalidClockTime(format!("'{}': {}", s, e)))
}

/// Local start of the day containing `instant` in `tz`, as UTC.
pub(crate) fn local_midnight(instant: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let midnight = instant
        .with_timezone(tz)
        .date_naive()
        .and_time(NaiveTime::default());
    tz.from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by DST: the day starts at 01:00 local.
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

// ── Tests ───────────────────────────────────────────────────────────────────
