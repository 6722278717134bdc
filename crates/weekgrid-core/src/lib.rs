//! weekgrid-core library.
//!
//! Lays appointments out in a seven-day grid: [`model`] validates and
//! normalizes appointments, [`bucket`] groups overlapping ones per day,
//! [`layout`] turns slots into positions and [`agenda`] drives the week.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums with a stable [`error::ErrorCode`] in the
//!   library; `anyhow::Result` for config loading.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

#![forbid(unsafe_code)]

pub mod agenda;
pub mod bucket;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;

pub use agenda::{AgendaSink, Placement, WeekAgenda, WeekRequest, WeekView};
pub use error::{ErrorCode, WeekError};
pub use layout::RowHeight;
pub use model::{Appointment, RawAppointment};
