//! Request bodies accepted by the HTTP API.
//!
//! Every field is optional at the serde level so that a missing field turns
//! into a `ServerError::Validation` with a readable message instead of a
//! generic deserialization failure.  Ids accept either a JSON number or a
//! numeric string, since the mobile client sends both.

use axum::http::HeaderMap;
use cookbook_shared::{Permission, RecipeId, UserId};
use cookbook_store::NewRecipe;
use serde::Deserialize;

use crate::error::ServerError;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub photo: Option<String>,
}

impl CreateRecipeRequest {
    /// Presence checks only; content rules live in the service.
    pub fn into_new_recipe(self) -> Result<NewRecipe, ServerError> {
        Ok(NewRecipe {
            title: required(self.title, "title")?,
            ingredients: required(self.ingredients, "ingredients")?,
            instructions: required(self.instructions, "instructions")?,
            user_id: UserId(required_id(self.user_id, "userId")?),
            photo: self.photo.filter(|p| !p.trim().is_empty()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecipeRequest {
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub permission: Option<i64>,
}

impl DeleteRecipeRequest {
    pub fn parts(&self) -> Result<(RecipeId, UserId, Permission), ServerError> {
        let id = RecipeId(required_id(self.id, "id")?);
        let requester = UserId(required_id(self.user_id, "userId")?);
        let permission = self
            .permission
            .map(Permission::from_level)
            .unwrap_or_default();
        Ok((id, requester, permission))
    }
}

/// Requester headers sent by `DELETE /recipes/:id`.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const PERMISSION_HEADER: &str = "x-user-permission";

/// Requester of a path-addressed delete, taken from the request headers.
/// A missing permission header means standard.
pub fn delete_requester(headers: &HeaderMap) -> Result<(UserId, Permission), ServerError> {
    let requester = UserId(required_id(header_id(headers, USER_ID_HEADER)?, "X-User-ID")?);
    let permission = header_id(headers, PERMISSION_HEADER)?
        .map(Permission::from_level)
        .unwrap_or_default();
    Ok((requester, permission))
}

fn header_id(headers: &HeaderMap, name: &str) -> Result<Option<i64>, ServerError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| ServerError::Validation(format!("{name} must be an integer")))?;
            parse_id(raw, name)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub recipe_id: Option<i64>,
}

impl LikeRequest {
    pub fn parts(&self) -> Result<(UserId, RecipeId), ServerError> {
        Ok((
            UserId(required_id(self.user_id, "userId")?),
            RecipeId(required_id(self.recipe_id, "recipeId")?),
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedQuery {
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// A required text field: absent and blank are both rejected.
pub fn required(value: Option<String>, field: &str) -> Result<String, ServerError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServerError::Validation(format!("{field} is required"))),
    }
}

/// A required password: only absent or empty is rejected.  Whitespace is a
/// legitimate password character, so nothing is trimmed.
pub fn required_password(value: Option<String>) -> Result<String, ServerError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServerError::Validation("password is required".to_string())),
    }
}

pub fn required_id(value: Option<i64>, field: &str) -> Result<i64, ServerError> {
    value.ok_or_else(|| ServerError::Validation(format!("{field} is required")))
}

/// Parse an id sent as text (multipart fields, query strings).
pub fn parse_id(raw: &str, field: &str) -> Result<Option<i64>, ServerError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| ServerError::Validation(format!("{field} must be an integer")))
}

/// Accepts `7`, `"7"`, `null`, `""` or a missing field.
mod lenient_id {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        match Option::<RawId>::deserialize(d)? {
            None => Ok(None),
            Some(RawId::Int(v)) => Ok(Some(v)),
            Some(RawId::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(RawId::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid id: {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let req: LikeRequest = serde_json::from_str(r#"{"userId": "12", "recipeId": 5}"#).unwrap();
        assert_eq!(req.parts().unwrap(), (UserId(12), RecipeId(5)));
    }

    #[test]
    fn test_missing_and_blank_ids() {
        let req: LikeRequest = serde_json::from_str(r#"{"userId": ""}"#).unwrap();
        let err = req.parts().unwrap_err();
        assert!(matches!(err, ServerError::Validation(msg) if msg == "userId is required"));

        let req: LikeRequest = serde_json::from_str(r#"{"userId": 1, "recipeId": null}"#).unwrap();
        assert!(matches!(req.parts(), Err(ServerError::Validation(_))));
    }

    #[test]
    fn test_non_numeric_id_rejected() {
        assert!(serde_json::from_str::<LikeRequest>(r#"{"userId": "abc"}"#).is_err());
        assert!(serde_json::from_str::<LikeRequest>(r#"{"userId": true}"#).is_err());
    }

    #[test]
    fn test_delete_permission_defaults_to_standard() {
        let req: DeleteRecipeRequest = serde_json::from_str(r#"{"id": 3, "userId": "4"}"#).unwrap();
        assert_eq!(
            req.parts().unwrap(),
            (RecipeId(3), UserId(4), Permission::Standard)
        );

        let req: DeleteRecipeRequest =
            serde_json::from_str(r#"{"id": 3, "userId": 4, "permission": 2}"#).unwrap();
        assert_eq!(req.parts().unwrap().2, Permission::Elevated);
    }

    #[test]
    fn test_create_recipe_presence() {
        let req: CreateRecipeRequest = serde_json::from_str(
            r#"{"title": "Tea", "ingredients": "", "instructions": "steep", "userId": 1}"#,
        )
        .unwrap();
        let err = req.into_new_recipe().unwrap_err();
        assert!(matches!(err, ServerError::Validation(msg) if msg == "ingredients is required"));

        let req: CreateRecipeRequest = serde_json::from_str(
            r#"{"title": "Tea", "ingredients": "leaves", "instructions": "steep", "userId": "1", "photo": ""}"#,
        )
        .unwrap();
        let recipe = req.into_new_recipe().unwrap();
        assert_eq!(recipe.user_id, UserId(1));
        assert_eq!(recipe.photo, None);
    }

    #[test]
    fn test_password_is_not_trimmed() {
        assert_eq!(required_password(Some("    ".into())).unwrap(), "    ");
        assert!(required_password(Some(String::new())).is_err());
        assert!(required_password(None).is_err());
    }

    #[test]
    fn test_delete_requester_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            delete_requester(&headers),
            Err(ServerError::Validation(msg)) if msg == "X-User-ID is required"
        ));

        headers.insert(USER_ID_HEADER, "7".parse().unwrap());
        assert_eq!(
            delete_requester(&headers).unwrap(),
            (UserId(7), Permission::Standard)
        );

        headers.insert(PERMISSION_HEADER, "2".parse().unwrap());
        assert_eq!(delete_requester(&headers).unwrap().1, Permission::Elevated);

        headers.insert(USER_ID_HEADER, "seven".parse().unwrap());
        assert!(matches!(
            delete_requester(&headers),
            Err(ServerError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 42 ", "userId").unwrap(), Some(42));
        assert_eq!(parse_id("", "userId").unwrap(), None);
        assert!(parse_id("4x", "userId").is_err());
    }
}
