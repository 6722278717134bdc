//! Seven-day agenda: window construction, bucketing and the layout pass.
//!
//! A [`WeekAgenda`] owns exactly [`DAYS_IN_WEEK`] [`DayBucket`]s keyed
//! `start_day + 0..=6`. Building one is all-or-nothing for parameter errors
//! ([`WeekError::InvalidParameters`]) and fail-soft for records: an invalid
//! record or one outside the window is noted in the [`BuildReport`] and the
//! rest of the batch continues.
//!
//! The layout pass arranges each bucket in day order and hands one
//! [`Placement`] per appointment to an [`AgendaSink`].

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::bucket::DayBucket;
use crate::error::{ErrorCode, WeekError};
use crate::layout::{Geometry, RowHeight, project_appointment};
use crate::model::{Appointment, RawAppointment, Slot};

pub const DAYS_IN_WEEK: usize = 7;

/// `Mon Jan 01 2024`.
const DAY_LABEL_FORMAT: &str = "%a %b %d %Y";

/// Which day the displayed week starts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Start on the given date itself.
    #[default]
    Given,
    /// Snap back to the preceding (or same) Monday.
    Monday,
    /// Snap back to the preceding (or same) Sunday.
    Sunday,
}

impl WeekStart {
    /// First displayed day for a requested start date.
    ///
    /// # Errors
    ///
    /// Returns [`WeekError::InvalidParameters`] when snapping back would pass
    /// [`NaiveDate::MIN`].
    pub fn anchor(self, date: NaiveDate) -> Result<NaiveDate, WeekError> {
        let back = match self {
            Self::Given => 0,
            Self::Monday => date.weekday().num_days_from_monday(),
            Self::Sunday => date.weekday().num_days_from_sunday(),
        };
        date.checked_sub_days(Days::new(u64::from(back)))
            .ok_or_else(|| WeekError::invalid(format!("no week starts before {date}")))
    }
}

/// The caller's request, validated once before anything is built.
///
/// Mirrors loosely-typed input: every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekRequest {
    /// Opaque handle passed through to the rendering side.
    pub target: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub agenda: Option<Vec<RawAppointment>>,
}

impl WeekRequest {
    /// Check the shape of the request.
    ///
    /// # Errors
    ///
    /// Returns [`WeekError::InvalidParameters`] when the target is missing or
    /// blank, the start date is missing, or the agenda is missing.
    pub fn validate(self) -> Result<(String, NaiveDateTime, Vec<RawAppointment>), WeekError> {
        let target = self
            .target
            .ok_or_else(|| WeekError::invalid("target is required"))?;
        validate_target(&target)?;
        let start = self
            .start_date
            .ok_or_else(|| WeekError::invalid("start_date must be a date"))?;
        let agenda = self
            .agenda
            .ok_or_else(|| WeekError::invalid("agenda must be a list of appointments"))?;
        Ok((target, start, agenda))
    }
}

/// The [`DAYS_IN_WEEK`] consecutive days starting at `start_day`.
///
/// `NaiveDate::iter_days` stops short of `NaiveDate::MAX`, so the days are
/// stepped explicitly.
fn window_days(start_day: NaiveDate) -> Result<Vec<NaiveDate>, WeekError> {
    let mut days = Vec::with_capacity(DAYS_IN_WEEK);
    let mut day = start_day;
    days.push(day);
    while days.len() < DAYS_IN_WEEK {
        day = day.succ_opt().ok_or_else(|| {
            WeekError::invalid(format!(
                "a week starting {start_day} runs past the last supported date"
            ))
        })?;
        days.push(day);
    }
    Ok(days)
}

fn validate_target(target: &str) -> Result<(), WeekError> {
    if target.trim().is_empty() {
        return Err(WeekError::invalid("target must not be empty"));
    }
    Ok(())
}

/// A record that did not make it into the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position of the record in the input list.
    pub index: usize,
    pub code: ErrorCode,
    pub reason: String,
}

/// Outcome of bucketing the input records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub accepted: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl BuildReport {
    fn skip(&mut self, index: usize, code: ErrorCode, reason: String) {
        self.skipped.push(SkippedRecord {
            index,
            code,
            reason,
        });
    }

    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.count(ErrorCode::InvalidAppointment)
    }

    #[must_use]
    pub fn out_of_window_count(&self) -> usize {
        self.count(ErrorCode::OutOfWindowAppointment)
    }

    fn count(&self, code: ErrorCode) -> usize {
        self.skipped.iter().filter(|s| s.code == code).count()
    }
}

/// Everything the rendering side needs to draw one appointment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Day ordinal within the week, `0..7`.
    pub day_index: usize,
    /// Ordinal within the day after sorting by start.
    pub position: usize,
    pub title: String,
    /// `HH:MM` of the start.
    pub start_time: String,
    pub slot_index: usize,
    pub slot_count: usize,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl Placement {
    fn new(day_index: usize, position: usize, appt: &Appointment, row_height: RowHeight) -> Self {
        let slot = appt.slot().unwrap_or(Slot::SOLO);
        Self {
            day_index,
            position,
            title: appt.title().to_string(),
            start_time: appt.formatted_start_time(),
            slot_index: slot.index,
            slot_count: slot.count,
            geometry: project_appointment(appt, row_height),
        }
    }
}

/// Receives placements during the layout pass, in day then position order.
pub trait AgendaSink {
    fn place(&mut self, placement: Placement);
}

impl AgendaSink for Vec<Placement> {
    fn place(&mut self, placement: Placement) {
        self.push(placement);
    }
}

/// One rendered day column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub label: String,
    pub placements: Vec<Placement>,
}

/// A fully laid-out week, free of any rendering-surface types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekView {
    pub target: String,
    pub start_day: NaiveDate,
    pub row_height: RowHeight,
    pub days: Vec<DayView>,
    pub skipped: Vec<SkippedRecord>,
}

/// Seven day buckets starting at `start_day`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekAgenda {
    target: String,
    start_day: NaiveDate,
    days: Vec<DayBucket>,
    report: BuildReport,
}

impl WeekAgenda {
    /// Build the week window and bucket `agenda` into it.
    ///
    /// `start` is truncated to its calendar day.
    ///
    /// # Errors
    ///
    /// Returns [`WeekError::InvalidParameters`] for a blank target or a start
    /// too close to [`NaiveDate::MAX`] to fit seven days.
    pub fn new(
        target: impl Into<String>,
        start: NaiveDateTime,
        agenda: &[RawAppointment],
    ) -> Result<Self, WeekError> {
        let target = target.into();
        validate_target(&target)?;
        let days = window_days(start.date())?;

        let mut week = Self::empty(target, start.date(), days);
        week.fill(agenda);
        Ok(week)
    }

    /// [`new`](Self::new) from a loosely-typed request.
    ///
    /// # Errors
    ///
    /// See [`WeekRequest::validate`].
    pub fn from_request(request: WeekRequest) -> Result<Self, WeekError> {
        let (target, start, agenda) = request.validate()?;
        Self::new(target, start, &agenda)
    }

    fn empty(target: String, start_day: NaiveDate, days: Vec<NaiveDate>) -> Self {
        Self {
            target,
            start_day,
            days: days.into_iter().map(DayBucket::new).collect(),
            report: BuildReport::default(),
        }
    }

    fn fill(&mut self, agenda: &[RawAppointment]) {
        for (index, raw) in agenda.iter().enumerate() {
            let appt = match Appointment::from_raw(raw) {
                Ok(appt) => appt,
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping invalid appointment");
                    self.report.skip(index, e.error_code(), e.to_string());
                    continue;
                }
            };

            let day = appt.reference_day();
            let Some(bucket) = self.bucket_for_mut(day) else {
                tracing::debug!(index, %day, "appointment outside the week, dropped");
                self.report.skip(
                    index,
                    ErrorCode::OutOfWindowAppointment,
                    format!("{day} is outside {} + {DAYS_IN_WEEK} days", self.start_day),
                );
                continue;
            };

            if bucket.push(appt).is_ok() {
                self.report.accepted += 1;
            }
        }

        tracing::info!(
            target_handle = %self.target,
            start_day = %self.start_day,
            accepted = self.report.accepted,
            invalid = self.report.invalid_count(),
            out_of_window = self.report.out_of_window_count(),
            "built week agenda"
        );
    }

    fn day_ordinal(&self, day: NaiveDate) -> Option<usize> {
        let offset = usize::try_from((day - self.start_day).num_days()).ok()?;
        (offset < DAYS_IN_WEEK).then_some(offset)
    }

    fn bucket_for_mut(&mut self, day: NaiveDate) -> Option<&mut DayBucket> {
        let ordinal = self.day_ordinal(day)?;
        self.days.get_mut(ordinal)
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn start_day(&self) -> NaiveDate {
        self.start_day
    }

    #[must_use]
    pub fn days(&self) -> &[DayBucket] {
        &self.days
    }

    /// The bucket for `day`, if it falls inside the window.
    #[must_use]
    pub fn bucket_for(&self, day: NaiveDate) -> Option<&DayBucket> {
        self.days.get(self.day_ordinal(day)?)
    }

    #[must_use]
    pub const fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Column header labels, one per day (`Mon Jan 01 2024`).
    #[must_use]
    pub fn day_labels(&self) -> Vec<String> {
        self.days.iter().map(|d| day_label(d.day())).collect()
    }

    /// Arrange every bucket in day order and feed placements to `sink`.
    pub fn lay_out<S: AgendaSink + ?Sized>(&mut self, row_height: RowHeight, sink: &mut S) {
        for (day_index, bucket) in self.days.iter_mut().enumerate() {
            bucket.arrange();
            for (position, appt) in bucket.appointments().iter().enumerate() {
                sink.place(Placement::new(day_index, position, appt, row_height));
            }
        }
    }

    /// Lay the week out into a self-contained [`WeekView`].
    #[must_use]
    pub fn view(&mut self, row_height: RowHeight) -> WeekView {
        let mut placements: Vec<Placement> = Vec::new();
        self.lay_out(row_height, &mut placements);

        let mut days: Vec<DayView> = self
            .days
            .iter()
            .map(|bucket| DayView {
                date: bucket.day(),
                label: day_label(bucket.day()),
                placements: Vec::with_capacity(bucket.len()),
            })
            .collect();
        for placement in placements {
            if let Some(day) = days.get_mut(placement.day_index) {
                day.placements.push(placement);
            }
        }

        WeekView {
            target: self.target.clone(),
            start_day: self.start_day,
            row_height,
            days,
            skipped: self.report.skipped.clone(),
        }
    }
}

/// Header label for one day column.
#[must_use]
pub fn day_label(day: NaiveDate) -> String {
    day.format(DAY_LABEL_FORMAT).to_string()
}

/// Header labels for the week starting at `start_day`.
///
/// # Errors
///
/// Returns [`WeekError::InvalidParameters`] when the week would run past
/// [`NaiveDate::MAX`].
pub fn week_labels(start_day: NaiveDate) -> Result<Vec<String>, WeekError> {
    Ok(window_days(start_day)?.into_iter().map(day_label).collect())
}
