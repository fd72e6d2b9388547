use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::Json;
use sea_orm::*;
use tracing::instrument;

use crate::entity::recipe;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, viewer_id};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::media::decode_data_uri;
use crate::models::recipe::*;
use crate::models::shared::{Pagination, parse_flag, resolve_page};
use crate::services::recipe::{self as recipes, RecipeFilter};
use crate::services::relation::{self, RecipeCollection};
use crate::services::shopping_list;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Recipes",
    operation_id = "listRecipes",
    summary = "List recipes",
    description = "Newest first. `tags` may be repeated and matches recipes with any of the slugs. `is_favorited` and `is_in_shopping_cart` take `1`/`true` and are ignored for anonymous callers.",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = RecipeListResponse),
        (status = 400, description = "Malformed query (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_recipes(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RecipeListQuery>,
) -> Result<Json<RecipeListResponse>, AppError> {
    let (page, per_page) = resolve_page(query.page, query.limit, &state.config.recipes);
    let viewer = viewer_id(&auth_user);

    let filter = RecipeFilter {
        author: query.author,
        tag_slugs: query
            .tags
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        favorited_by: viewer.filter(|_| parse_flag(query.is_favorited.as_deref())),
        in_cart_of: viewer.filter(|_| parse_flag(query.is_in_shopping_cart.as_deref())),
    };

    let (rows, total) = recipes::list_recipes(&state.db, &filter, page, per_page).await?;
    let data = recipes::load_recipe_views(&state.db, rows, viewer).await?;

    Ok(Json(RecipeListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "getRecipe",
    summary = "Get a recipe by ID",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_recipe(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, AppError> {
    let model = recipes::find_recipe(&state.db, id).await?;
    single_view(&state.db, model, viewer_id(&auth_user)).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Recipes",
    operation_id = "createRecipe",
    summary = "Publish a recipe",
    description = "The caller becomes the author. `image` is a base64 data URI and is required.",
    request_body = RecipeWriteRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, name = %payload.name))]
pub async fn create_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecipeWriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_recipe_write(&payload, WriteMode::Create)?;
    recipes::ensure_references_exist(&state.db, &payload).await?;
    let image_url = store_image(&state, payload.image.as_deref())
        .await?
        .ok_or_else(|| AppError::Validation("Image is required".into()))?;

    let txn = state.db.begin().await?;
    let model = recipes::create_recipe(&txn, auth_user.user_id, &payload, image_url).await?;
    txn.commit().await?;

    let view = single_view(&state.db, model, Some(auth_user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "updateRecipe",
    summary = "Update a recipe",
    description = "Author only. Tags and ingredients replace the stored sets; omit `image` to keep the current one.",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, id))]
pub async fn update_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RecipeWriteRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let existing = recipes::find_recipe(&state.db, id).await?;
    auth_user.require_owner(existing.author_id)?;

    validate_recipe_write(&payload, WriteMode::Update)?;
    recipes::ensure_references_exist(&state.db, &payload).await?;
    let image_url = store_image(&state, payload.image.as_deref()).await?;

    let txn = state.db.begin().await?;
    let locked = recipes::find_recipe_for_update(&txn, id).await?;
    let model = recipes::update_recipe(&txn, locked, &payload, image_url).await?;
    txn.commit().await?;

    single_view(&state.db, model, Some(auth_user.user_id))
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Recipes",
    operation_id = "deleteRecipe",
    summary = "Delete a recipe",
    description = "Author only. Removes the recipe along with its ingredient lines, tag links, favorites and cart entries.",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn delete_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = recipes::find_recipe_for_update(&txn, id).await?;
    auth_user.require_owner(existing.author_id)?;
    recipes::delete_recipe(&txn, id).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/favorite",
    tag = "Favorites",
    operation_id = "addFavorite",
    summary = "Add a recipe to favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added", body = ShortRecipeResponse),
        (status = 400, description = "Already in favorites (ALREADY_EXISTS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn add_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    add_to_collection(&state, RecipeCollection::Favorites, auth_user.user_id, id).await
}

#[utoipa::path(
    delete,
    path = "/{id}/favorite",
    tag = "Favorites",
    operation_id = "removeFavorite",
    summary = "Remove a recipe from favorites",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found or not in favorites (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn remove_favorite(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    remove_from_collection(&state, RecipeCollection::Favorites, auth_user.user_id, id).await
}

#[utoipa::path(
    post,
    path = "/{id}/shopping_cart",
    tag = "Shopping Cart",
    operation_id = "addToShoppingCart",
    summary = "Add a recipe to the shopping cart",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 201, description = "Added", body = ShortRecipeResponse),
        (status = 400, description = "Already in the cart (ALREADY_EXISTS)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn add_to_shopping_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    add_to_collection(&state, RecipeCollection::ShoppingCart, auth_user.user_id, id).await
}

#[utoipa::path(
    delete,
    path = "/{id}/shopping_cart",
    tag = "Shopping Cart",
    operation_id = "removeFromShoppingCart",
    summary = "Remove a recipe from the shopping cart",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Recipe not found or not in the cart (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn remove_from_shopping_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    remove_from_collection(&state, RecipeCollection::ShoppingCart, auth_user.user_id, id).await
}

#[utoipa::path(
    get,
    path = "/download_shopping_cart",
    tag = "Shopping Cart",
    operation_id = "downloadShoppingCart",
    summary = "Download the shopping list",
    description = "Sums ingredient amounts over every recipe in the cart, grouped by ingredient and unit, as a numbered plain-text list.",
    responses(
        (status = 200, description = "Shopping list", content_type = "text/plain", body = String),
        (status = 400, description = "Cart is empty (EMPTY_CART)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn download_shopping_cart(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let items = shopping_list::aggregate(&state.db, auth_user.user_id).await?;
    tracing::debug!(lines = items.len(), "Shopping list aggregated");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        shopping_list::render(&items),
    ))
}

/// Body limit for recipe writes: the configured image size in base64 plus room for the rest.
pub fn recipe_body_limit(max_image_bytes: u64) -> DefaultBodyLimit {
    let encoded = max_image_bytes.saturating_mul(4).div_ceil(3);
    let limit = encoded.saturating_add(256 * 1024);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

async fn add_to_collection(
    state: &AppState,
    collection: RecipeCollection,
    user_id: i32,
    recipe_id: i32,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), AppError> {
    let txn = state.db.begin().await?;
    let target = relation::add_recipe(&txn, collection, user_id, recipe_id).await?;
    txn.commit().await?;
    Ok((StatusCode::CREATED, Json(ShortRecipeResponse::from(target))))
}

async fn remove_from_collection(
    state: &AppState,
    collection: RecipeCollection,
    user_id: i32,
    recipe_id: i32,
) -> Result<StatusCode, AppError> {
    let txn = state.db.begin().await?;
    relation::remove_recipe(&txn, collection, user_id, recipe_id).await?;
    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Decode and persist an uploaded image. `None` in, `None` out.
async fn store_image(state: &AppState, image: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(raw) = image.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    let decoded = decode_data_uri(raw)?;
    let url = state.media.put_image(&decoded).await?;
    Ok(Some(url))
}

async fn single_view<C: ConnectionTrait>(
    db: &C,
    model: recipe::Model,
    viewer: Option<i32>,
) -> Result<RecipeResponse, AppError> {
    recipes::load_recipe_views(db, vec![model], viewer)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("Recipe view missing".into()))
}
