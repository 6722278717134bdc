//! Position arithmetic for one appointment inside a day column.

#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};

use crate::error::WeekError;
use crate::model::{Appointment, Slot};

/// Hours represented by one full row height.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Horizontal gutter reserved per slot, in percent of the column width.
pub const GUTTER_PERCENT: f64 = 2.0;

/// Height of a 24-hour day column in the caller's unit (usually pixels).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RowHeight(f64);

impl RowHeight {
    /// # Errors
    ///
    /// Returns [`WeekError::InvalidParameters`] for non-finite or non-positive
    /// heights.
    pub fn new(value: f64) -> Result<Self, WeekError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(WeekError::invalid(format!(
                "row height must be a positive number, got {value}"
            )))
        }
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for RowHeight {
    type Error = WeekError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RowHeight> for f64 {
    fn from(height: RowHeight) -> Self {
        height.0
    }
}

/// Where an appointment sits inside its day column.
///
/// `top`/`height` are in the row-height unit; `left_percent`/`width_percent`
/// are percentages of the column width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    pub top: f64,
    pub height: f64,
    pub width_percent: f64,
    pub left_percent: f64,
}

/// Project time and slot coordinates onto a day column.
#[must_use]
pub fn project(
    start_offset_hours: f64,
    duration_hours: f64,
    slot: Slot,
    row_height: RowHeight,
) -> Geometry {
    let unit = row_height.get();
    let count = slot.count.max(1) as f64;
    let index = slot.index as f64;

    let width_percent = GUTTER_PERCENT.mul_add(-count, 100.0) / count;
    let left_percent = width_percent.mul_add(index, index * GUTTER_PERCENT) + 1.0;

    Geometry {
        top: start_offset_hours / HOURS_PER_DAY * unit,
        height: duration_hours / HOURS_PER_DAY * unit,
        width_percent,
        left_percent,
    }
}

/// [`project`] an arranged appointment. Unarranged appointments are laid out
/// as if they overlapped nothing.
#[must_use]
pub fn project_appointment(appt: &Appointment, row_height: RowHeight) -> Geometry {
    project(
        appt.start_offset_hours(),
        appt.duration_hours(),
        appt.slot().unwrap_or(Slot::SOLO),
        row_height,
    )
}
