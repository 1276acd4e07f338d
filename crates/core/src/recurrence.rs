//! Recurrence expansion for slot creation.
//!
//! A recurring create request is expanded eagerly into concrete time ranges,
//! one per occurrence, each keeping the duration of the original range.
//! Expansion is capped at [`MAX_EXPANDED_SLOTS`] rows.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::overlap::TimeRange;

/// Default horizon for recurring series without an explicit end date.
pub const DEFAULT_HORIZON_DAYS: i64 = 365;

/// Maximum number of slots a single create request may generate.
///
/// Large enough for a year of daily occurrences.
pub const MAX_EXPANDED_SLOTS: usize = 400;

/// How a slot repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    #[default]
    Once,
    Daily,
    Weekly,
    /// Specific days of every month.
    Custom,
}

impl RecurrenceKind {
    /// Database representation (`slots.recurrence_kind`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Custom => "custom",
        }
    }
}

/// Recurrence descriptor supplied with a create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceSpec {
    #[serde(rename = "type", default)]
    pub kind: RecurrenceKind,
    /// Days of the month (1-31). Only used by [`RecurrenceKind::Custom`].
    #[serde(default)]
    pub custom_days: Vec<u32>,
    /// Last calendar day (UTC, inclusive) on which an occurrence may start.
    pub end_date: Option<NaiveDate>,
}

impl RecurrenceSpec {
    pub fn once() -> Self {
        Self::default()
    }

    /// End date for recurring kinds, defaulting to one year after `start`.
    pub fn effective_end_date(&self, start: &TimeRange) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| (start.start + Duration::days(DEFAULT_HORIZON_DAYS)).date_naive())
    }
}

/// Validate that a range has a positive duration.
pub fn validate_range(range: &TimeRange) -> Result<(), CoreError> {
    if range.end <= range.start {
        return Err(CoreError::Validation(
            "end_time must be after start_time".to_string(),
        ));
    }
    Ok(())
}

/// Expand a recurrence descriptor into concrete occurrence ranges.
///
/// Occurrences are returned in chronological order. Fails with
/// [`CoreError::Validation`] for an empty or non-positive range, an end date
/// before the first occurrence, an empty or out-of-range custom day list, or
/// when more than `max_rows` occurrences would be generated.
pub fn expand(
    range: &TimeRange,
    spec: &RecurrenceSpec,
    max_rows: usize,
) -> Result<Vec<TimeRange>, CoreError> {
    validate_range(range)?;

    if spec.kind == RecurrenceKind::Once {
        return Ok(vec![*range]);
    }

    let end_date = spec.effective_end_date(range);
    if end_date < range.start.date_naive() {
        return Err(CoreError::Validation(
            "recurrence end_date must not be before the start date".to_string(),
        ));
    }

    match spec.kind {
        RecurrenceKind::Once => Ok(vec![*range]),
        RecurrenceKind::Daily => expand_fixed_step(range, Duration::days(1), end_date, max_rows),
        RecurrenceKind::Weekly => expand_fixed_step(range, Duration::days(7), end_date, max_rows),
        RecurrenceKind::Custom => expand_days_of_month(range, &spec.custom_days, end_date, max_rows),
    }
}

fn expand_fixed_step(
    range: &TimeRange,
    step: Duration,
    end_date: NaiveDate,
    max_rows: usize,
) -> Result<Vec<TimeRange>, CoreError> {
    let duration = range.duration();
    let mut out = Vec::new();
    let mut current = range.start;

    while current.date_naive() <= end_date {
        push_capped(&mut out, TimeRange::new(current, current + duration), max_rows)?;
        current += step;
    }
    Ok(out)
}

fn expand_days_of_month(
    range: &TimeRange,
    custom_days: &[u32],
    end_date: NaiveDate,
    max_rows: usize,
) -> Result<Vec<TimeRange>, CoreError> {
    if custom_days.is_empty() {
        return Err(CoreError::Validation(
            "custom recurrence requires at least one day of the month".to_string(),
        ));
    }
    if let Some(bad) = custom_days.iter().find(|d| !(1..=31).contains(*d)) {
        return Err(CoreError::Validation(format!(
            "Invalid day of month {bad}. Must be between 1 and 31"
        )));
    }

    let days: BTreeSet<u32> = custom_days.iter().copied().collect();
    let duration = range.duration();
    let first_date = range.start.date_naive();
    let time_of_day = NaiveTime::from_hms_opt(range.start.hour(), range.start.minute(), 0)
        .ok_or_else(|| CoreError::Internal("invalid time of day".to_string()))?;

    let mut out = Vec::new();
    let (mut year, mut month) = (first_date.year(), first_date.month());

    while (year, month) <= (end_date.year(), end_date.month()) {
        for &day in &days {
            // Months without this day are skipped.
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            if date < first_date || date > end_date {
                continue;
            }
            let start = Utc.from_utc_datetime(&date.and_time(time_of_day));
            push_capped(&mut out, TimeRange::new(start, start + duration), max_rows)?;
        }

        (year, month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
    }
    Ok(out)
}

fn push_capped(
    out: &mut Vec<TimeRange>,
    range: TimeRange,
    max_rows: usize,
) -> Result<(), CoreError> {
    if out.len() >= max_rows {
        return Err(CoreError::Validation(format!(
            "Recurrence would generate more than {max_rows} slots; choose an earlier end_date"
        )));
    }
    out.push(range);
    Ok(())
}
