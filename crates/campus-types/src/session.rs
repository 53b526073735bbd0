//! Academic session status

use serde::{Deserialize, Serialize};

/// Status of an academic session.
///
/// At most one session is active at any time; the switch is performed by a
/// single transaction that deactivates every other session first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The session all scoped operations currently target
    Active,
    /// A past or future session
    Inactive,
}

impl SessionStatus {
    /// Get the status as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Whether this is the active status
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = SessionStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(SessionStatusParseError(s.to_string())),
        }
    }
}

/// Error parsing a session status from a string
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown session status: {0}")]
pub struct SessionStatusParseError(pub String);
