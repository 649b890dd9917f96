//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an authenticated user, as asserted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// Venue staff (futsal operator).
    Staff,
    /// Regular player.
    Player,
}

impl UserRole {
    /// Whether this role may act on records owned by other users.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Player => "player",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = courtbook_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "player" => Ok(Self::Player),
            _ => Err(courtbook_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, staff, player"
            ))),
        }
    }
}
