//! CRUD operations for [`User`] records.

use cookbook_shared::{Permission, UserId};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{conflict_on_duplicate, Result};
use crate::models::User;

impl Database {
    /// Insert a new account with the standard permission level.
    ///
    /// A duplicate email surfaces as [`StoreError::Conflict`](crate::StoreError::Conflict).
    pub fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<UserId> {
        self.conn()
            .execute(
                "INSERT INTO users (email, password_hash, name, permission)
                 VALUES (?1, ?2, ?3, ?4)",
                params![email, password_hash, name, Permission::Standard.level()],
            )
            .map_err(|e| conflict_on_duplicate(e, "email"))?;

        Ok(UserId(self.conn().last_insert_rowid()))
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                "SELECT id, email, password_hash, name, permission
                 FROM users
                 WHERE email = ?1",
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        permission: Permission::from_level(row.get(4)?),
    })
}

#[cfg(test)]
mod tests {
    use crate::database::tests::test_store;
    use crate::StoreError;

    use super::*;

    impl Database {
        fn get_user(&self, id: UserId) -> Result<Option<User>> {
            let user = self
                .conn()
                .query_row(
                    "SELECT id, email, password_hash, name, permission
                     FROM users
                     WHERE id = ?1",
                    params![id.0],
                    row_to_user,
                )
                .optional()?;
            Ok(user)
        }

        fn set_user_permission(&self, id: UserId, permission: Permission) -> Result<bool> {
            let affected = self.conn().execute(
                "UPDATE users SET permission = ?1 WHERE id = ?2",
                params![permission.level(), id.0],
            )?;
            Ok(affected > 0)
        }
    }

    #[test]
    fn insert_and_find() {
        let (store, _dir) = test_store();
        let db = store.connect().unwrap();

        let id = db
            .insert_user("cook@example.com", "$argon2id$hash", Some("Cook"))
            .unwrap();

        let user = db.find_user_by_email("cook@example.com").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name.as_deref(), Some("Cook"));
        assert_eq!(user.permission, Permission::Standard);
        assert_eq!(db.get_user(id).unwrap(), Some(user));
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let (store, _dir) = test_store();
        let db = store.connect().unwrap();

        db.insert_user("cook@example.com", "h1", None).unwrap();
        let err = db.insert_user("cook@example.com", "h2", None).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn email_is_case_sensitive() {
        let (store, _dir) = test_store();
        let db = store.connect().unwrap();

        db.insert_user("cook@example.com", "h1", None).unwrap();
        assert!(db.email_exists("cook@example.com").unwrap());
        assert!(!db.email_exists("Cook@example.com").unwrap());
        db.insert_user("Cook@example.com", "h2", None).unwrap();
    }

    #[test]
    fn missing_user() {
        let (store, _dir) = test_store();
        let db = store.connect().unwrap();

        assert!(db.find_user_by_email("nobody@example.com").unwrap().is_none());
        assert!(db.get_user(UserId(99)).unwrap().is_none());
    }

    #[test]
    fn elevate_user() {
        let (store, _dir) = test_store();
        let db = store.connect().unwrap();

        let id = db.insert_user("admin@example.com", "h", None).unwrap();
        assert!(db.set_user_permission(id, Permission::Elevated).unwrap());
        assert_eq!(db.get_user(id).unwrap().unwrap().permission, Permission::Elevated);
        assert!(!db.set_user_permission(UserId(404), Permission::Elevated).unwrap());
    }
}
