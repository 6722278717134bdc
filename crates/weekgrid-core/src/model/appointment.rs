//! A single appointment normalized into day-relative decimal hours.
//!
//! Construction applies one repair rule: an appointment whose end precedes its
//! start is given a synthetic [`REPAIR_DURATION_HOURS`]-hour duration starting at
//! the original start. The reference day (the bucket key) is always taken from
//! the original start instant.

#![allow(clippy::cast_precision_loss)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ErrorCode;

/// Duration given to appointments whose end precedes their start.
pub const REPAIR_DURATION_HOURS: i64 = 2;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// An appointment record as handed over by the caller, before validation.
///
/// Every field is optional: a missing start or end date makes the record
/// invalid, a missing title becomes the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAppointment {
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub title: Option<String>,
}

impl RawAppointment {
    #[must_use]
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, title: impl Into<String>) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            title: Some(title.into()),
        }
    }
}

/// Why a raw record could not become an [`Appointment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("appointment has no valid start date")]
    MissingStart,
    #[error("appointment has no valid end date")]
    MissingEnd,
    #[error("appointment end cannot be repaired within the supported date range")]
    Unrepairable,
}

impl AppointmentError {
    #[must_use]
    pub const fn error_code(self) -> ErrorCode {
        ErrorCode::InvalidAppointment
    }
}

/// Horizontal lane assigned by overlap grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Zero-based position within the overlap group.
    pub index: usize,
    /// Number of members in the overlap group.
    pub count: usize,
}

impl Slot {
    /// The slot of an appointment that overlaps nothing.
    pub const SOLO: Self = Self { index: 0, count: 1 };
}

/// A validated appointment with its day-relative coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    start: NaiveDateTime,
    end: NaiveDateTime,
    title: String,
    reference_day: NaiveDate,
    start_offset_hours: f64,
    end_offset_hours: f64,
    duration_hours: f64,
    repaired: bool,
    slot: Option<Slot>,
}

impl Appointment {
    /// Build an appointment from two well-formed instants.
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentError::Unrepairable`] when the end precedes the
    /// start and the repaired end would pass [`NaiveDateTime::MAX`].
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        title: impl Into<String>,
    ) -> Result<Self, AppointmentError> {
        let reference_day = start.date();

        let repaired = end < start;
        let end = if repaired {
            start
                .checked_add_signed(TimeDelta::hours(REPAIR_DURATION_HOURS))
                .ok_or(AppointmentError::Unrepairable)?
        } else {
            end
        };

        let start_offset_hours = offset_from_midnight(start);
        let end_offset_hours = offset_from_midnight(end);
        let duration_hours = (end - start).num_milliseconds() as f64 / MILLIS_PER_HOUR;

        Ok(Self {
            start,
            end,
            title: title.into(),
            reference_day,
            start_offset_hours,
            end_offset_hours,
            duration_hours,
            repaired,
            slot: None,
        })
    }

    /// Validate a raw record.
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentError`] when the start or end date is missing, or
    /// the end cannot be repaired.
    pub fn from_raw(raw: &RawAppointment) -> Result<Self, AppointmentError> {
        let start = raw.start_date.ok_or(AppointmentError::MissingStart)?;
        let end = raw.end_date.ok_or(AppointmentError::MissingEnd)?;
        Self::new(start, end, raw.title.clone().unwrap_or_default())
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// End instant after the end-before-start repair.
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Calendar day of the original start; the bucket key.
    #[must_use]
    pub const fn reference_day(&self) -> NaiveDate {
        self.reference_day
    }

    /// Decimal hours since midnight of the start's own day.
    #[must_use]
    pub const fn start_offset_hours(&self) -> f64 {
        self.start_offset_hours
    }

    /// Decimal hours since midnight of the end's own day.
    #[must_use]
    pub const fn end_offset_hours(&self) -> f64 {
        self.end_offset_hours
    }

    #[must_use]
    pub const fn duration_hours(&self) -> f64 {
        self.duration_hours
    }

    /// True when the end was moved because it preceded the start.
    #[must_use]
    pub const fn was_repaired(&self) -> bool {
        self.repaired
    }

    /// Slot assigned by the last grouping pass, if any.
    #[must_use]
    pub const fn slot(&self) -> Option<Slot> {
        self.slot
    }

    pub(crate) const fn set_slot(&mut self, slot: Slot) {
        self.slot = Some(slot);
    }

    /// Zero-padded 24-hour `HH:MM` of the original start.
    #[must_use]
    pub fn formatted_start_time(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.formatted_start_time(), self.title)
    }
}

fn offset_from_midnight(instant: NaiveDateTime) -> f64 {
    let midnight = instant.date().and_time(NaiveTime::MIN);
    (instant - midnight).num_milliseconds() as f64 / MILLIS_PER_HOUR
}
