//! Duplicate-guarded relation toggles: favorites, shopping cart and follows.
//!
//! Each (actor, target) pair is either absent or present. Adding a present
//! pair or removing an absent one is an error. The existence pre-check is
//! best effort; a concurrent insert that trips the primary key is reported
//! the same way.

use std::collections::HashSet;

use sea_orm::sea_query::{Query as SeaQuery, SimpleExpr};
use sea_orm::*;

use crate::entity::{cart, favorite, follow, recipe, user};
use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationState {
    Absent,
    Present,
}

/// A per-user set of recipes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

impl RecipeCollection {
    fn already_present(self) -> AppError {
        AppError::AlreadyExists(match self {
            RecipeCollection::Favorites => "Recipe is already in favorites".into(),
            RecipeCollection::ShoppingCart => "Recipe is already in the shopping cart".into(),
        })
    }

    fn not_present(self) -> AppError {
        AppError::NotFound(match self {
            RecipeCollection::Favorites => "Recipe is not in favorites".into(),
            RecipeCollection::ShoppingCart => "Recipe is not in the shopping cart".into(),
        })
    }
}

/// Condition matching recipes in `user_id`'s collection.
pub fn recipes_in(collection: RecipeCollection, user_id: i32) -> SimpleExpr {
    let subquery = match collection {
        RecipeCollection::Favorites => SeaQuery::select()
            .column(favorite::Column::RecipeId)
            .from(favorite::Entity)
            .and_where(favorite::Column::UserId.eq(user_id))
            .to_owned(),
        RecipeCollection::ShoppingCart => SeaQuery::select()
            .column(cart::Column::RecipeId)
            .from(cart::Entity)
            .and_where(cart::Column::UserId.eq(user_id))
            .to_owned(),
    };
    recipe::Column::Id.in_subquery(subquery)
}

pub async fn recipe_state<C: ConnectionTrait>(
    db: &C,
    collection: RecipeCollection,
    user_id: i32,
    recipe_id: i32,
) -> Result<RelationState, AppError> {
    let present = match collection {
        RecipeCollection::Favorites => favorite::Entity::find_by_id((user_id, recipe_id))
            .one(db)
            .await?
            .is_some(),
        RecipeCollection::ShoppingCart => cart::Entity::find_by_id((user_id, recipe_id))
            .one(db)
            .await?
            .is_some(),
    };
    Ok(if present {
        RelationState::Present
    } else {
        RelationState::Absent
    })
}

/// Put a recipe into the user's collection and return the recipe.
pub async fn add_recipe<C: ConnectionTrait>(
    db: &C,
    collection: RecipeCollection,
    user_id: i32,
    recipe_id: i32,
) -> Result<recipe::Model, AppError> {
    let target = recipe::Entity::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))?;

    if recipe_state(db, collection, user_id, recipe_id).await? == RelationState::Present {
        return Err(collection.already_present());
    }

    let now = chrono::Utc::now();
    let inserted = match collection {
        RecipeCollection::Favorites => favorite::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(now),
        }
        .insert(db)
        .await
        .map(|_| ()),
        RecipeCollection::ShoppingCart => cart::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(now),
        }
        .insert(db)
        .await
        .map(|_| ()),
    };
    inserted.map_err(|e| AppError::from_insert(e, || collection.already_present()))?;

    Ok(target)
}

pub async fn remove_recipe<C: ConnectionTrait>(
    db: &C,
    collection: RecipeCollection,
    user_id: i32,
    recipe_id: i32,
) -> Result<RelationState, AppError> {
    recipe::Entity::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))?;

    let deleted = match collection {
        RecipeCollection::Favorites => {
            favorite::Entity::delete_by_id((user_id, recipe_id))
                .exec(db)
                .await?
        }
        RecipeCollection::ShoppingCart => {
            cart::Entity::delete_by_id((user_id, recipe_id))
                .exec(db)
                .await?
        }
    };
    if deleted.rows_affected == 0 {
        return Err(collection.not_present());
    }
    Ok(RelationState::Absent)
}

/// `follower_id` starts following `followee_id`. Returns the followee.
pub async fn follow<C: ConnectionTrait>(
    db: &C,
    follower_id: i32,
    followee_id: i32,
) -> Result<user::Model, AppError> {
    if follower_id == followee_id {
        return Err(AppError::SelfReference("You cannot subscribe to yourself".into()));
    }

    let followee = user::Entity::find_by_id(followee_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let existing = follow::Entity::find_by_id((followee_id, follower_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::AlreadyExists(
            "You are already subscribed to this user".into(),
        ));
    }

    follow::ActiveModel {
        user_id: Set(followee_id),
        follower_id: Set(follower_id),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await
    .map_err(|e| {
        AppError::from_insert(e, || {
            AppError::AlreadyExists("You are already subscribed to this user".into())
        })
    })?;

    Ok(followee)
}

pub async fn unfollow<C: ConnectionTrait>(
    db: &C,
    follower_id: i32,
    followee_id: i32,
) -> Result<RelationState, AppError> {
    user::Entity::find_by_id(followee_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let deleted = follow::Entity::delete_by_id((followee_id, follower_id))
        .exec(db)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(AppError::NotFound(
            "You are not subscribed to this user".into(),
        ));
    }
    Ok(RelationState::Absent)
}

/// Which of `candidates` the viewer follows. Empty for anonymous viewers.
pub async fn followed_among<C: ConnectionTrait>(
    db: &C,
    viewer: Option<i32>,
    candidates: &[i32],
) -> Result<HashSet<i32>, AppError> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    if candidates.is_empty() {
        return Ok(HashSet::new());
    }
    let ids = follow::Entity::find()
        .select_only()
        .column(follow::Column::UserId)
        .filter(follow::Column::FollowerId.eq(viewer))
        .filter(follow::Column::UserId.is_in(candidates.to_vec()))
        .into_tuple::<i32>()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}
