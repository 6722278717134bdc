pub mod appointment;

pub use appointment::{
    Appointment, AppointmentError, REPAIR_DURATION_HOURS, RawAppointment, Slot,
};
