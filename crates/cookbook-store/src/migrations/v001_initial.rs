//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `users`, `recipes` and `user_likes`.
//! Uniqueness of emails and of (user, recipe) likes is enforced here, not
//! only by the existence checks in the service layer.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,          -- case-sensitive as stored
    password_hash TEXT NOT NULL,                 -- argon2id PHC string
    name          TEXT,
    permission    INTEGER NOT NULL DEFAULT 1     -- 2 = elevated
);

-- ----------------------------------------------------------------
-- Recipes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS recipes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    ingredients  TEXT NOT NULL,
    instructions TEXT NOT NULL,
    user_id      INTEGER NOT NULL,               -- owner, not a foreign key
    photo        TEXT,                           -- /uploads/<file> or external URL
    created_at   TEXT NOT NULL                   -- YYYY-MM-DD HH:MM:SS (UTC)
);

CREATE INDEX IF NOT EXISTS idx_recipes_created_at ON recipes(created_at);

-- ----------------------------------------------------------------
-- Likes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS user_likes (
    user_id   INTEGER NOT NULL,
    recipe_id INTEGER NOT NULL,

    PRIMARY KEY (user_id, recipe_id)
);

CREATE INDEX IF NOT EXISTS idx_user_likes_recipe ON user_likes(recipe_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
