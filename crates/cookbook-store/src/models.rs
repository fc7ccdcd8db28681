//! Domain model structs persisted in the SQLite database.
//!
//! [`Recipe`] serializes to the JSON shape the mobile client reads, so the
//! server hands it out unchanged.

use chrono::NaiveDateTime;
use cookbook_shared::{Permission, RecipeId, UserId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered account.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Login email, unique and compared case-sensitively.
    pub email: String,
    /// Argon2id PHC string.  Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional display name.
    pub name: Option<String>,
    pub permission: Permission,
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A published recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    /// Creator of the recipe; scopes default delete authorization.
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Photo URL, if one was attached.
    pub photo: Option<String>,
    /// Creation time (UTC, second precision).
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

/// Fields supplied when publishing a recipe.  Id and timestamp are assigned
/// on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub user_id: UserId,
    pub photo: Option<String>,
}

/// `YYYY-MM-DD HH:MM:SS` (de)serialization for [`NaiveDateTime`].
pub mod timestamp {
    use chrono::NaiveDateTime;
    use cookbook_shared::constants::TIMESTAMP_FORMAT;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
