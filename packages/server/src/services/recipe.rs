use std::collections::{BTreeSet, HashMap, HashSet};

use sea_orm::sea_query::{LockType, Query as SeaQuery};
use sea_orm::*;

use super::relation::{RecipeCollection, followed_among, recipes_in};
use crate::entity::{
    cart, favorite, ingredient, recipe, recipe_ingredient, recipe_tag, tag, user,
};
use crate::error::AppError;
use crate::models::catalog::TagResponse;
use crate::models::recipe::{RecipeIngredientResponse, RecipeResponse, RecipeWriteRequest};
use crate::models::shared::page_offset;
use crate::models::user::UserResponse;

/// Filters for the recipe listing, already resolved against the caller.
#[derive(Debug, Default)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    pub tag_slugs: Vec<String>,
    /// Restrict to this user's favorites.
    pub favorited_by: Option<i32>,
    /// Restrict to this user's shopping cart.
    pub in_cart_of: Option<i32>,
}

pub async fn find_recipe<C: ConnectionTrait>(db: &C, id: i32) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

pub async fn find_recipe_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

/// Page through recipes newest first. Returns the page and the total match count.
pub async fn list_recipes<C: ConnectionTrait>(
    db: &C,
    filter: &RecipeFilter,
    page: u64,
    per_page: u64,
) -> Result<(Vec<recipe::Model>, u64), AppError> {
    let mut select = recipe::Entity::find();

    if let Some(author) = filter.author {
        select = select.filter(recipe::Column::AuthorId.eq(author));
    }

    if !filter.tag_slugs.is_empty() {
        select = select.filter(
            recipe::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(recipe_tag::Column::RecipeId)
                    .from(recipe_tag::Entity)
                    .and_where(
                        recipe_tag::Column::TagId.in_subquery(
                            SeaQuery::select()
                                .column(tag::Column::Id)
                                .from(tag::Entity)
                                .and_where(tag::Column::Slug.is_in(filter.tag_slugs.clone()))
                                .to_owned(),
                        ),
                    )
                    .to_owned(),
            ),
        );
    }

    if let Some(user_id) = filter.favorited_by {
        select = select.filter(recipes_in(RecipeCollection::Favorites, user_id));
    }
    if let Some(user_id) = filter.in_cart_of {
        select = select.filter(recipes_in(RecipeCollection::ShoppingCart, user_id));
    }

    let total = select.clone().paginate(db, per_page).num_items().await?;

    let rows = select
        .order_by_desc(recipe::Column::CreatedAt)
        .order_by_desc(recipe::Column::Id)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(db)
        .await?;

    Ok((rows, total))
}

/// Reject writes that reference tags or ingredients that do not exist.
pub async fn ensure_references_exist<C: ConnectionTrait>(
    db: &C,
    req: &RecipeWriteRequest,
) -> Result<(), AppError> {
    let found: HashSet<i32> = tag::Entity::find()
        .select_only()
        .column(tag::Column::Id)
        .filter(tag::Column::Id.is_in(req.tags.clone()))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    let missing: BTreeSet<i32> = req
        .tags
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Unknown tag ids: {}",
            join_ids(&missing)
        )));
    }

    let wanted: Vec<i32> = req.ingredients.iter().map(|i| i.id).collect();
    let found: HashSet<i32> = ingredient::Entity::find()
        .select_only()
        .column(ingredient::Column::Id)
        .filter(ingredient::Column::Id.is_in(wanted.clone()))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();
    let missing: BTreeSet<i32> = wanted.into_iter().filter(|id| !found.contains(id)).collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Unknown ingredient ids: {}",
            join_ids(&missing)
        )));
    }
    Ok(())
}

fn join_ids(ids: &BTreeSet<i32>) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Insert a recipe with its tag set and ingredient lines. Call inside a transaction.
pub async fn create_recipe<C: ConnectionTrait>(
    db: &C,
    author_id: i32,
    req: &RecipeWriteRequest,
    image_url: String,
) -> Result<recipe::Model, AppError> {
    let model = recipe::ActiveModel {
        author_id: Set(author_id),
        name: Set(req.name.trim().to_string()),
        image: Set(image_url),
        text: Set(req.text.clone()),
        cooking_time: Set(req.cooking_time),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    replace_components(db, model.id, req).await?;
    Ok(model)
}

/// Overwrite a recipe's fields and replace its tag set and ingredient lines.
/// The author never changes. `image_url` of `None` keeps the stored image.
pub async fn update_recipe<C: ConnectionTrait>(
    db: &C,
    existing: recipe::Model,
    req: &RecipeWriteRequest,
    image_url: Option<String>,
) -> Result<recipe::Model, AppError> {
    let mut active: recipe::ActiveModel = existing.into();
    active.name = Set(req.name.trim().to_string());
    active.text = Set(req.text.clone());
    active.cooking_time = Set(req.cooking_time);
    if let Some(url) = image_url {
        active.image = Set(url);
    }
    let model = active.update(db).await?;

    replace_components(db, model.id, req).await?;
    Ok(model)
}

async fn replace_components<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    req: &RecipeWriteRequest,
) -> Result<(), AppError> {
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;

    let tags = req.tags.iter().map(|&tag_id| recipe_tag::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(tag_id),
    });
    recipe_tag::Entity::insert_many(tags)
        .exec_without_returning(db)
        .await?;

    let lines = req.ingredients.iter().map(|line| recipe_ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(line.id),
        amount: Set(line.amount),
        ..Default::default()
    });
    recipe_ingredient::Entity::insert_many(lines)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Delete a recipe and every row that references it. Call inside a transaction.
pub async fn delete_recipe<C: ConnectionTrait>(db: &C, recipe_id: i32) -> Result<(), AppError> {
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    favorite::Entity::delete_many()
        .filter(favorite::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    cart::Entity::delete_many()
        .filter(cart::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    recipe::Entity::delete_by_id(recipe_id).exec(db).await?;
    Ok(())
}

/// Build full read views for `recipes`, annotated for `viewer`.
///
/// Loads authors, tags, ingredient lines and the viewer's relations in one
/// query each, independent of the number of recipes.
pub async fn load_recipe_views<C: ConnectionTrait>(
    db: &C,
    recipes: Vec<recipe::Model>,
    viewer: Option<i32>,
) -> Result<Vec<RecipeResponse>, AppError> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<i32> = recipes
        .iter()
        .map(|r| r.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let subscribed = followed_among(db, viewer, &author_ids).await?;

    let mut tags: HashMap<i32, Vec<TagResponse>> = HashMap::new();
    for (link, tag) in recipe_tag::Entity::find()
        .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.clone()))
        .find_also_related(tag::Entity)
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?
    {
        if let Some(tag) = tag {
            tags.entry(link.recipe_id).or_default().push(tag.into());
        }
    }

    let mut lines: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
    for (line, ingredient) in recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.clone()))
        .find_also_related(ingredient::Entity)
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await?
    {
        if let Some(ingredient) = ingredient {
            lines
                .entry(line.recipe_id)
                .or_default()
                .push(RecipeIngredientResponse {
                    id: ingredient.id,
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: line.amount,
                });
        }
    }

    let (favorited, in_cart) = match viewer {
        Some(user_id) => (
            collection_members(db, RecipeCollection::Favorites, user_id, &recipe_ids).await?,
            collection_members(db, RecipeCollection::ShoppingCart, user_id, &recipe_ids).await?,
        ),
        None => (HashSet::new(), HashSet::new()),
    };

    recipes
        .into_iter()
        .map(|r| {
            let author = authors
                .get(&r.author_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("Author of recipe {} missing", r.id)))?;
            Ok(RecipeResponse {
                id: r.id,
                tags: tags.remove(&r.id).unwrap_or_default(),
                author: UserResponse::new(author, subscribed.contains(&r.author_id)),
                ingredients: lines.remove(&r.id).unwrap_or_default(),
                is_favorited: favorited.contains(&r.id),
                is_in_shopping_cart: in_cart.contains(&r.id),
                name: r.name,
                image: r.image,
                text: r.text,
                cooking_time: r.cooking_time,
            })
        })
        .collect()
}

async fn collection_members<C: ConnectionTrait>(
    db: &C,
    collection: RecipeCollection,
    user_id: i32,
    recipe_ids: &[i32],
) -> Result<HashSet<i32>, AppError> {
    let ids = match collection {
        RecipeCollection::Favorites => {
            favorite::Entity::find()
                .select_only()
                .column(favorite::Column::RecipeId)
                .filter(favorite::Column::UserId.eq(user_id))
                .filter(favorite::Column::RecipeId.is_in(recipe_ids.to_vec()))
                .into_tuple::<i32>()
                .all(db)
                .await?
        }
        RecipeCollection::ShoppingCart => {
            cart::Entity::find()
                .select_only()
                .column(cart::Column::RecipeId)
                .filter(cart::Column::UserId.eq(user_id))
                .filter(cart::Column::RecipeId.is_in(recipe_ids.to_vec()))
                .into_tuple::<i32>()
                .all(db)
                .await?
        }
    };
    Ok(ids.into_iter().collect())
}
