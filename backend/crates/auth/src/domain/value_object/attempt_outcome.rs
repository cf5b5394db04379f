use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum AttemptOutcome {
    Success = 0,
    /// Wrong password, unknown identity or inactive account
    Failure = 1,
    /// Rejected by the lockout policy before any credential check
    Locked = 2,
}

impl AttemptOutcome {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Failure => "failure",
            AttemptOutcome::Locked => "locked",
        }
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(AttemptOutcome::Success),
            1 => Some(AttemptOutcome::Failure),
            2 => Some(AttemptOutcome::Locked),
            _ => None,
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
