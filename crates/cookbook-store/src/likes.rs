use cookbook_shared::{RecipeId, UserId};
use rusqlite::params;

use crate::database::Database;
use crate::error::{conflict_on_duplicate, Result};
use crate::models::Recipe;
use crate::recipes::row_to_recipe;

impl Database {
    pub fn like_exists(&self, user_id: UserId, recipe_id: RecipeId) -> Result<bool> {
        let exists: bool = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM user_likes WHERE user_id = ?1 AND recipe_id = ?2)",
            params![user_id.0, recipe_id.0],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Record a like.  A second like for the same pair is a
    /// [`StoreError::Conflict`](crate::StoreError::Conflict), never a silent overwrite.
    pub fn insert_like(&self, user_id: UserId, recipe_id: RecipeId) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO user_likes (user_id, recipe_id) VALUES (?1, ?2)",
                params![user_id.0, recipe_id.0],
            )
            .map_err(|e| conflict_on_duplicate(e, "like"))?;
        Ok(())
    }

    /// Recipes liked by `user_id`, newest first.  Likes pointing at deleted
    /// recipes drop out of the join.
    pub fn list_liked_recipes(&self, user_id: UserId) -> Result<Vec<Recipe>> {
        let mut stmt = self.conn().prepare(
            "SELECT r.id, r.title, r.ingredients, r.instructions, r.user_id, r.photo, r.created_at
             FROM recipes r
             JOIN user_likes l ON l.recipe_id = r.id
             WHERE l.user_id = ?1
             ORDER BY r.created_at DESC, r.id DESC",
        )?;

        let rows = stmt.query_map(params![user_id.0], row_to_recipe)?;

        let mut recipes = Vec::new();
        for row in rows {
            recipes.push(row?);
        }
        Ok(recipes)
    }
}
