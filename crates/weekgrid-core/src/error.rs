use std::fmt;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidParameters,
    ConfigParseError,
    InvalidAppointment,
    OutOfWindowAppointment,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidParameters => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidAppointment => "E2001",
            Self::OutOfWindowAppointment => "E2002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidParameters => "Invalid parameters",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidAppointment => "Invalid appointment",
            Self::OutOfWindowAppointment => "Appointment outside the displayed week",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidParameters => Some(
                "Pass a non-empty target, a start date, an appointment list and a positive row height.",
            ),
            Self::ConfigParseError => Some("Fix syntax in .weekgrid/config.toml and retry."),
            Self::InvalidAppointment => {
                Some("Give every appointment a well-formed start_date and end_date.")
            }
            Self::OutOfWindowAppointment => {
                Some("Move the start date so the appointment's day falls inside the week.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl serde::Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Failures that abort building or laying out a week.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeekError {
    #[error("invalid parameters: {reason}")]
    InvalidParameters { reason: String },
}

impl WeekError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidParameters { .. } => ErrorCode::InvalidParameters,
        }
    }

    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code().hint().unwrap_or_default().to_string()
    }
}
