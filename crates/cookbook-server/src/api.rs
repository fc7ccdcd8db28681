use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::{HeaderMap, Method},
    routing::{delete, get, post},
    Json, Router,
};
use cookbook_shared::constants::UPLOADS_ROUTE;
use cookbook_shared::{Permission, RecipeId, UserId};
use cookbook_store::{NewRecipe, Recipe};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::photo_store::PhotoStore;
use crate::schema::{
    self, CreateRecipeRequest, DeleteRecipeRequest, LikeRequest, LikedQuery, LoginRequest,
    RegisterRequest, SearchQuery,
};
use crate::service::RecipeService;

#[derive(Clone)]
pub struct AppState {
    pub service: RecipeService,
    pub photos: Arc<PhotoStore>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    // Multipart framing on top of the largest accepted photo.
    let body_limit = state.config.max_photo_size.saturating_add(1024 * 1024);

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/add", post(add_recipe_with_photo))
        .route("/recipes/delete", post(delete_recipe))
        .route("/recipes/:id", delete(delete_recipe_by_id))
        .route("/recipes/liked", get(liked_recipes))
        .route("/recipes/search-simple", get(search_recipes))
        .route("/like", post(like_recipe))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.photos.base_path()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    success: bool,
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    success: bool,
    message: &'static str,
    user_id: UserId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    success: bool,
    user_id: UserId,
    name: Option<String>,
    permission: Permission,
}

#[derive(Serialize)]
struct RecipesResponse {
    success: bool,
    count: usize,
    recipes: Vec<Recipe>,
}

impl From<Vec<Recipe>> for RecipesResponse {
    fn from(recipes: Vec<Recipe>) -> Self {
        Self {
            success: true,
            count: recipes.len(),
            recipes,
        }
    }
}

#[derive(Serialize)]
struct RecipeCreatedResponse {
    success: bool,
    message: &'static str,
    recipe: Recipe,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    message: &'static str,
    deleted: bool,
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Run a blocking service call off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, ServerError>
where
    F: FnOnce() -> Result<T, ServerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("Blocking task failed: {e}")))?
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ServerError> {
    let Json(req) = payload?;
    let email = schema::required(req.email, "email")?;
    let password = schema::required_password(req.password)?;
    let name = req.name.filter(|n| !n.trim().is_empty());

    let service = state.service.clone();
    let user_id =
        run_blocking(move || service.register(&email, &password, name.as_deref())).await?;

    Ok(Json(RegisterResponse {
        success: true,
        message: "Registration successful",
        user_id,
    }))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ServerError> {
    let Json(req) = payload?;
    // Missing credentials fail like any other login.
    let (Some(email), Some(password)) = (
        req.email.filter(|e| !e.trim().is_empty()),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ServerError::InvalidCredentials);
    };

    let service = state.service.clone();
    let user = run_blocking(move || service.authenticate(&email, &password)).await?;

    Ok(Json(LoginResponse {
        success: true,
        user_id: user.id,
        name: user.name,
        permission: user.permission,
    }))
}

async fn list_recipes(State(state): State<AppState>) -> Result<Json<RecipesResponse>, ServerError> {
    let service = state.service.clone();
    let recipes = run_blocking(move || service.list_recipes()).await?;
    Ok(Json(recipes.into()))
}

async fn create_recipe(
    State(state): State<AppState>,
    payload: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<Json<RecipeCreatedResponse>, ServerError> {
    let Json(req) = payload?;
    let new_recipe = req.into_new_recipe()?;

    let service = state.service.clone();
    let recipe = run_blocking(move || service.create_recipe(new_recipe)).await?;

    Ok(Json(RecipeCreatedResponse {
        success: true,
        message: "Recipe added",
        recipe,
    }))
}

struct PhotoUpload {
    file_name: Option<String>,
    content_type: Option<String>,
    data: bytes::Bytes,
}

/// Multipart variant of recipe creation used by the mobile client.
async fn add_recipe_with_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecipeCreatedResponse>, ServerError> {
    let mut multipart = multipart?;
    let mut form = CreateRecipeRequest::default();
    let mut photo = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "photo" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                if !data.is_empty() {
                    photo = Some(PhotoUpload {
                        file_name,
                        content_type,
                        data,
                    });
                }
            }
            "title" => form.title = Some(field.text().await?),
            "ingredients" => form.ingredients = Some(field.text().await?),
            "instructions" => form.instructions = Some(field.text().await?),
            "userId" => form.user_id = schema::parse_id(&field.text().await?, "userId")?,
            _ => {}
        }
    }

    let mut new_recipe = form.into_new_recipe()?;
    RecipeService::validate_recipe(&new_recipe)?;

    let stored_photo = match photo {
        Some(upload) => {
            let name = state
                .photos
                .store_photo(
                    &upload.data,
                    upload.file_name.as_deref(),
                    upload.content_type.as_deref(),
                )
                .await?;
            new_recipe.photo = Some(PhotoStore::url_for(&name));
            Some(name)
        }
        None => None,
    };

    let recipe = match insert_recipe(&state, new_recipe).await {
        Ok(recipe) => recipe,
        Err(e) => {
            if let Some(name) = stored_photo {
                if let Err(cleanup) = state.photos.delete_photo(&name).await {
                    warn!(photo = %name, error = %cleanup, "Failed to remove orphaned photo");
                }
            }
            return Err(e);
        }
    };

    info!(recipe_id = %recipe.id, photo = ?recipe.photo, "Recipe uploaded via multipart");

    Ok(Json(RecipeCreatedResponse {
        success: true,
        message: "Recipe added",
        recipe,
    }))
}

async fn insert_recipe(state: &AppState, new_recipe: NewRecipe) -> Result<Recipe, ServerError> {
    let service = state.service.clone();
    run_blocking(move || service.create_recipe(new_recipe)).await
}

async fn delete_recipe(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRecipeRequest>, JsonRejection>,
) -> Result<Json<DeleteResponse>, ServerError> {
    let Json(req) = payload?;
    let (id, requester, permission) = req.parts()?;

    let service = state.service.clone();
    let deleted = run_blocking(move || service.delete_recipe(id, requester, permission)).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Recipe deleted",
        deleted,
    }))
}

/// Path-addressed delete; the requester travels in headers.
async fn delete_recipe_by_id(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, ServerError> {
    let Path(id) = path?;
    let id = RecipeId(id);
    let (requester, permission) = schema::delete_requester(&headers)?;

    let service = state.service.clone();
    let deleted = run_blocking(move || service.delete_recipe(id, requester, permission)).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Recipe deleted",
        deleted,
    }))
}

async fn liked_recipes(
    State(state): State<AppState>,
    query: Result<Query<LikedQuery>, QueryRejection>,
) -> Result<Json<RecipesResponse>, ServerError> {
    let Query(query) = query?;
    let user_id = UserId(schema::required_id(query.user_id, "userId")?);

    let service = state.service.clone();
    let recipes = run_blocking(move || service.list_liked_recipes(user_id)).await?;
    Ok(Json(recipes.into()))
}

async fn search_recipes(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<RecipesResponse>, ServerError> {
    let Query(query) = query?;
    let q = query.q.unwrap_or_default();

    let service = state.service.clone();
    let recipes = run_blocking(move || service.search_recipes(&q)).await?;
    Ok(Json(recipes.into()))
}

async fn like_recipe(
    State(state): State<AppState>,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServerError> {
    let Json(req) = payload?;
    let (user_id, recipe_id) = req.parts()?;

    let service = state.service.clone();
    run_blocking(move || service.like_recipe(user_id, recipe_id)).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Like added",
    }))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
