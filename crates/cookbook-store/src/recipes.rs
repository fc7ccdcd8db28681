//! CRUD operations for [`Recipe`] records.

use chrono::{NaiveDateTime, Timelike, Utc};
use cookbook_shared::constants::TIMESTAMP_FORMAT;
use cookbook_shared::{RecipeId, UserId};
use rusqlite::params;

use crate::database::Database;
use crate::error::Result;
use crate::models::{NewRecipe, Recipe};

const RECIPE_COLUMNS: &str = "id, title, ingredients, instructions, user_id, photo, created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a recipe and return it with its assigned id and timestamp.
    pub fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        let now = Utc::now().naive_utc();
        let created_at = now.with_nanosecond(0).unwrap_or(now);

        self.conn().execute(
            "INSERT INTO recipes (title, ingredients, instructions, user_id, photo, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                recipe.title,
                recipe.ingredients,
                recipe.instructions,
                recipe.user_id.0,
                recipe.photo,
                created_at.format(TIMESTAMP_FORMAT).to_string(),
            ],
        )?;

        Ok(Recipe {
            id: RecipeId(self.conn().last_insert_rowid()),
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            user_id: recipe.user_id,
            photo: recipe.photo.clone(),
            created_at,
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List all recipes, newest id first.
    pub fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY id DESC"))?;

        let rows = stmt.query_map([], row_to_recipe)?;

        let mut recipes = Vec::new();
        for row in rows {
            recipes.push(row?);
        }
        Ok(recipes)
    }

    /// Substring search over title and ingredients, newest id first.
    ///
    /// Matching is case-insensitive for ASCII letters only (SQLite `LIKE`).
    pub fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>> {
        let pattern = format!("%{}%", escape_like(query));

        let mut stmt = self.conn().prepare(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes
             WHERE title LIKE ?1 ESCAPE '\\' OR ingredients LIKE ?1 ESCAPE '\\'
             ORDER BY id DESC"
        ))?;

        let rows = stmt.query_map(params![pattern], row_to_recipe)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a recipe regardless of owner.  Returns the affected row count.
    pub fn delete_recipe(&self, id: RecipeId) -> Result<usize> {
        let affected = self
            .conn()
            .execute("DELETE FROM recipes WHERE id = ?1", params![id.0])?;
        Ok(affected)
    }

    /// Delete a recipe only if `owner` created it.  Returns the affected row
    /// count, which is zero for a missing recipe or a different owner.
    pub fn delete_recipe_owned_by(&self, id: RecipeId, owner: UserId) -> Result<usize> {
        let affected = self.conn().execute(
            "DELETE FROM recipes WHERE id = ?1 AND user_id = ?2",
            params![id.0, owner.0],
        )?;
        Ok(affected)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Escape `LIKE` wildcards so user input only matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Map a `rusqlite::Row` selected with `RECIPE_COLUMNS` to a [`Recipe`].
pub(crate) fn row_to_recipe(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    let created_str: String = row.get(6)?;

    let created_at = NaiveDateTime::parse_from_str(&created_str, TIMESTAMP_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Recipe {
        id: RecipeId(row.get(0)?),
        title: row.get(1)?,
        ingredients: row.get(2)?,
        instructions: row.get(3)?,
        user_id: UserId(row.get(4)?),
        photo: row.get(5)?,
        created_at,
    })
}
