//! Account, recipe and like use-cases.
//!
//! Every method is synchronous and opens its own connection through
//! [`Store::connect`]; the connection is dropped when the method returns,
//! on success and on every error path alike.  Callers on the async side run
//! these methods inside `spawn_blocking`.

use cookbook_shared::constants::MIN_PASSWORD_LEN;
use cookbook_shared::password::{hash_password, verify_dummy, verify_password};
use cookbook_shared::{Permission, RecipeId, UserId};
use cookbook_store::{NewRecipe, Recipe, Store, StoreError};
use tracing::{debug, info};

use crate::error::ServerError;

const EMAIL_TAKEN: &str = "User with this email already exists";
const ALREADY_LIKED: &str = "Recipe already liked";

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub name: Option<String>,
    pub permission: Permission,
}

#[derive(Debug, Clone)]
pub struct RecipeService {
    store: Store,
}

impl RecipeService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserId, ServerError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ServerError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServerError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let db = self.store.connect()?;

        if db.email_exists(email)? {
            return Err(ServerError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash = hash_password(password)?;

        // A concurrent registration can still win the race; the UNIQUE
        // constraint reports it as a conflict.
        let id = db
            .insert_user(email, &password_hash, name)
            .map_err(|e| conflict_as(e, EMAIL_TAKEN))?;

        info!(user_id = %id, "Registered user");
        Ok(id)
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<AuthenticatedUser, ServerError> {
        let db = self.store.connect()?;

        let Some(user) = db.find_user_by_email(email)? else {
            debug!("Login for unknown email");
            verify_dummy(password);
            return Err(ServerError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            debug!(user_id = %user.id, "Login with wrong password");
            return Err(ServerError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(AuthenticatedUser {
            id: user.id,
            name: user.name,
            permission: user.permission,
        })
    }

    // ------------------------------------------------------------------
    // Recipes
    // ------------------------------------------------------------------

    /// Content rules for a new recipe.  Checked before any side effect, so
    /// callers can validate ahead of writing an uploaded photo.
    pub fn validate_recipe(recipe: &NewRecipe) -> Result<(), ServerError> {
        for (value, field) in [
            (&recipe.title, "title"),
            (&recipe.ingredients, "ingredients"),
            (&recipe.instructions, "instructions"),
        ] {
            if value.trim().is_empty() {
                return Err(ServerError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, ServerError> {
        Self::validate_recipe(&recipe)?;

        let db = self.store.connect()?;
        let recipe = db.insert_recipe(&recipe)?;

        info!(recipe_id = %recipe.id, owner = %recipe.user_id, "Recipe created");
        Ok(recipe)
    }

    pub fn list_recipes(&self) -> Result<Vec<Recipe>, ServerError> {
        let db = self.store.connect()?;
        Ok(db.list_recipes()?)
    }

    pub fn list_liked_recipes(&self, user_id: UserId) -> Result<Vec<Recipe>, ServerError> {
        let db = self.store.connect()?;
        Ok(db.list_liked_recipes(user_id)?)
    }

    /// Blank queries list everything.
    pub fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>, ServerError> {
        let query = query.trim();
        let db = self.store.connect()?;
        if query.is_empty() {
            return Ok(db.list_recipes()?);
        }
        Ok(db.search_recipes(query)?)
    }

    /// Delete a recipe on behalf of `requester`.
    ///
    /// Elevated users delete by id alone; everyone else only deletes their
    /// own recipes.  A delete that matches nothing (missing recipe, foreign
    /// recipe) is not an error: it returns `Ok(false)`.
    pub fn delete_recipe(
        &self,
        id: RecipeId,
        requester: UserId,
        permission: Permission,
    ) -> Result<bool, ServerError> {
        let db = self.store.connect()?;

        let affected = if permission.is_elevated() {
            db.delete_recipe(id)?
        } else {
            db.delete_recipe_owned_by(id, requester)?
        };

        if affected == 0 {
            info!(recipe_id = %id, requester = %requester, ?permission, "Delete matched no recipe");
        } else {
            info!(recipe_id = %id, requester = %requester, ?permission, "Recipe deleted");
        }
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Likes
    // ------------------------------------------------------------------

    pub fn like_recipe(&self, user_id: UserId, recipe_id: RecipeId) -> Result<(), ServerError> {
        let db = self.store.connect()?;

        if db.like_exists(user_id, recipe_id)? {
            return Err(ServerError::Conflict(ALREADY_LIKED.to_string()));
        }

        db.insert_like(user_id, recipe_id)
            .map_err(|e| conflict_as(e, ALREADY_LIKED))?;

        debug!(user_id = %user_id, recipe_id = %recipe_id, "Recipe liked");
        Ok(())
    }
}

fn conflict_as(err: StoreError, message: &str) -> ServerError {
    match err {
        StoreError::Conflict(_) => ServerError::Conflict(message.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;

    pub(crate) fn test_service() -> (RecipeService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.db"), Duration::from_secs(5)).unwrap();
        (RecipeService::new(store), dir)
    }

    fn recipe(title: &str, owner: UserId) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            ingredients: "potatoes, salt".to_string(),
            instructions: "boil".to_string(),
            user_id: owner,
            photo: None,
        }
    }

    fn ids(recipes: &[Recipe]) -> Vec<RecipeId> {
        recipes.iter().map(|r| r.id).collect()
    }

    #[test]
    fn register_twice_is_conflict() {
        let (service, _dir) = test_service();

        service.register("cook@example.com", "secret", None).unwrap();
        let err = service
            .register("cook@example.com", "other-secret", Some("Twin"))
            .unwrap_err();
        assert!(matches!(err, ServerError::Conflict(msg) if msg == EMAIL_TAKEN));
    }

    #[test]
    fn password_length_boundary() {
        let (service, _dir) = test_service();

        let err = service.register("a@example.com", "abc", None).unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));

        service.register("a@example.com", "abcd", None).unwrap();
    }

    #[test]
    fn register_requires_email_and_password() {
        let (service, _dir) = test_service();

        assert!(matches!(
            service.register("", "secret", None),
            Err(ServerError::Validation(_))
        ));
        assert!(matches!(
            service.register("a@example.com", "", None),
            Err(ServerError::Validation(_))
        ));
    }

    #[test]
    fn password_stored_hashed() {
        let (service, _dir) = test_service();

        let id = service.register("a@example.com", "secret", None).unwrap();
        let user = service
            .store
            .connect()
            .unwrap()
            .find_user_by_email("a@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(user.id, id);
        assert_ne!(user.password_hash, "secret");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn authenticate_exact_password_only() {
        let (service, _dir) = test_service();

        let id = service
            .register("cook@example.com", "Secret1", Some("Cook"))
            .unwrap();

        let user = service.authenticate("cook@example.com", "Secret1").unwrap();
        assert_eq!(
            user,
            AuthenticatedUser {
                id,
                name: Some("Cook".to_string()),
                permission: Permission::Standard,
            }
        );

        for wrong in ["secret1", "Secret", "Secret1 ", ""] {
            assert!(matches!(
                service.authenticate("cook@example.com", wrong),
                Err(ServerError::InvalidCredentials)
            ));
        }
    }

    #[test]
    fn unknown_email_and_wrong_password_look_the_same() {
        let (service, _dir) = test_service();
        service.register("cook@example.com", "secret", None).unwrap();

        let unknown = service.authenticate("ghost@example.com", "secret").unwrap_err();
        let wrong = service.authenticate("cook@example.com", "nope").unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, ServerError::InvalidCredentials));
        assert!(matches!(wrong, ServerError::InvalidCredentials));
    }

    #[test]
    fn empty_ingredients_rejected_without_row() {
        let (service, _dir) = test_service();

        let mut input = recipe("Soup", UserId(1));
        input.ingredients = "   ".to_string();
        let err = service.create_recipe(input).unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));

        assert!(service.list_recipes().unwrap().is_empty());
    }

    #[test]
    fn list_recipes_newest_id_first() {
        let (service, _dir) = test_service();
        assert!(service.list_recipes().unwrap().is_empty());

        let a = service.create_recipe(recipe("a", UserId(1))).unwrap();
        let b = service.create_recipe(recipe("b", UserId(1))).unwrap();
        let c = service.create_recipe(recipe("c", UserId(2))).unwrap();

        assert_eq!(ids(&service.list_recipes().unwrap()), vec![c.id, b.id, a.id]);
    }

    #[test]
    fn like_twice_is_conflict() {
        let (service, _dir) = test_service();
        let r = service.create_recipe(recipe("Pie", UserId(1))).unwrap();

        service.like_recipe(UserId(2), r.id).unwrap();
        let err = service.like_recipe(UserId(2), r.id).unwrap_err();
        assert!(matches!(err, ServerError::Conflict(msg) if msg == ALREADY_LIKED));

        // A different user may still like it.
        service.like_recipe(UserId(3), r.id).unwrap();
    }

    #[test]
    fn liked_recipes_are_exactly_the_liked_ones() {
        let (service, _dir) = test_service();
        let r1 = service.create_recipe(recipe("r1", UserId(1))).unwrap();
        let r2 = service.create_recipe(recipe("r2", UserId(1))).unwrap();
        let r3 = service.create_recipe(recipe("r3", UserId(1))).unwrap();

        assert!(service.list_liked_recipes(UserId(5)).unwrap().is_empty());

        service.like_recipe(UserId(5), r1.id).unwrap();
        service.like_recipe(UserId(5), r3.id).unwrap();
        service.like_recipe(UserId(6), r2.id).unwrap();

        // Same-second timestamps fall back to id order.
        assert_eq!(
            ids(&service.list_liked_recipes(UserId(5)).unwrap()),
            vec![r3.id, r1.id]
        );
    }

    #[test]
    fn owner_deletes_own_recipe() {
        let (service, _dir) = test_service();
        let r = service.create_recipe(recipe("Mine", UserId(1))).unwrap();

        assert!(service.delete_recipe(r.id, UserId(1), Permission::Standard).unwrap());
        assert!(service.list_recipes().unwrap().is_empty());
    }

    #[test]
    fn non_owner_delete_is_silent_no_op() {
        let (service, _dir) = test_service();
        let r = service.create_recipe(recipe("Theirs", UserId(1))).unwrap();

        let deleted = service
            .delete_recipe(r.id, UserId(2), Permission::Standard)
            .unwrap();
        assert!(!deleted);
        assert_eq!(ids(&service.list_recipes().unwrap()), vec![r.id]);

        // Missing recipes behave the same way.
        assert!(!service
            .delete_recipe(RecipeId(999), UserId(1), Permission::Standard)
            .unwrap());
    }

    #[test]
    fn elevated_deletes_any_recipe() {
        let (service, _dir) = test_service();
        let r = service.create_recipe(recipe("Anyone's", UserId(1))).unwrap();

        assert!(service.delete_recipe(r.id, UserId(42), Permission::Elevated).unwrap());
        assert!(service.list_recipes().unwrap().is_empty());
    }

    #[test]
    fn elevated_permission_comes_from_storage() {
        let (service, _dir) = test_service();
        let id = service.register("admin@example.com", "secret", None).unwrap();
        service
            .store
            .connect()
            .unwrap()
            .conn()
            .execute("UPDATE users SET permission = 2 WHERE id = ?1", [id.0])
            .unwrap();

        let user = service.authenticate("admin@example.com", "secret").unwrap();
        assert_eq!(user.permission, Permission::Elevated);
    }

    #[test]
    fn search_blank_lists_all() {
        let (service, _dir) = test_service();
        let a = service.create_recipe(recipe("Goulash", UserId(1))).unwrap();
        let b = service.create_recipe(recipe("Pilaf", UserId(1))).unwrap();

        assert_eq!(ids(&service.search_recipes("  ").unwrap()), vec![b.id, a.id]);
        assert_eq!(ids(&service.search_recipes("pil").unwrap()), vec![b.id]);
    }

    #[test]
    fn storage_constraint_reports_conflict() {
        let (service, _dir) = test_service();
        let db = service.store.connect().unwrap();

        // Bypass the existence check to hit the constraint directly.
        db.insert_user("race@example.com", "h", None).unwrap();
        let err = db.insert_user("race@example.com", "h", None).unwrap_err();
        assert!(matches!(
            conflict_as(err, EMAIL_TAKEN),
            ServerError::Conflict(msg) if msg == EMAIL_TAKEN
        ));
    }
}
