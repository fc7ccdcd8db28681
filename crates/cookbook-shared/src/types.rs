use serde::{Deserialize, Serialize};

use crate::constants::{ELEVATED_PERMISSION_LEVEL, STANDARD_PERMISSION_LEVEL};

// Row ids are SQLite INTEGER PRIMARY KEYs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecipeId(pub i64);

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account permission.  Persisted and exchanged as an integer level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Permission {
    #[default]
    Standard,
    /// May delete any recipe regardless of ownership.
    Elevated,
}

impl Permission {
    /// Only the elevated level is special; every other value is standard.
    pub fn from_level(level: i64) -> Self {
        if level == ELEVATED_PERMISSION_LEVEL {
            Self::Elevated
        } else {
            Self::Standard
        }
    }

    pub fn level(self) -> i64 {
        match self {
            Self::Standard => STANDARD_PERMISSION_LEVEL,
            Self::Elevated => ELEVATED_PERMISSION_LEVEL,
        }
    }

    pub fn is_elevated(self) -> bool {
        self == Self::Elevated
    }
}

impl From<i64> for Permission {
    fn from(level: i64) -> Self {
        Self::from_level(level)
    }
}

impl From<Permission> for i64 {
    fn from(permission: Permission) -> Self {
        permission.level()
    }
}
