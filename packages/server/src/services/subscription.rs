use std::collections::HashMap;

use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;

use crate::entity::{follow, recipe, user};
use crate::error::AppError;
use crate::models::recipe::ShortRecipeResponse;
use crate::models::shared::page_offset;
use crate::models::user::{SubscriptionResponse, UserResponse};

/// Authors `follower_id` follows, ordered by username. Returns the page and the total.
pub async fn list_followees<C: ConnectionTrait>(
    db: &C,
    follower_id: i32,
    page: u64,
    per_page: u64,
) -> Result<(Vec<user::Model>, u64), AppError> {
    let select = user::Entity::find().filter(
        user::Column::Id.in_subquery(
            SeaQuery::select()
                .column(follow::Column::UserId)
                .from(follow::Entity)
                .and_where(follow::Column::FollowerId.eq(follower_id))
                .to_owned(),
        ),
    );

    let total = select.clone().paginate(db, per_page).num_items().await?;
    let rows = select
        .order_by_asc(user::Column::Username)
        .offset(Some(page_offset(page, per_page)))
        .limit(Some(per_page))
        .all(db)
        .await?;
    Ok((rows, total))
}

/// Subscription views for authors the caller follows: each author's newest
/// `recipes_limit` recipes plus their total recipe count.
pub async fn subscription_views<C: ConnectionTrait>(
    db: &C,
    authors: Vec<user::Model>,
    recipes_limit: u64,
) -> Result<Vec<SubscriptionResponse>, AppError> {
    if authors.is_empty() {
        return Ok(Vec::new());
    }
    let author_ids: Vec<i32> = authors.iter().map(|u| u.id).collect();

    let counts: HashMap<i32, i64> = recipe::Entity::find()
        .select_only()
        .column(recipe::Column::AuthorId)
        .column_as(recipe::Column::Id.count(), "recipes_count")
        .filter(recipe::Column::AuthorId.is_in(author_ids))
        .group_by(recipe::Column::AuthorId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let mut views = Vec::with_capacity(authors.len());
    for author in authors {
        let recipes_count = counts.get(&author.id).copied().unwrap_or(0);
        let recipes = if recipes_count > 0 && recipes_limit > 0 {
            latest_recipes(db, author.id, recipes_limit).await?
        } else {
            Vec::new()
        };
        views.push(SubscriptionResponse {
            user: UserResponse::new(author, true),
            recipes: recipes.into_iter().map(ShortRecipeResponse::from).collect(),
            recipes_count: u64::try_from(recipes_count).unwrap_or(0),
        });
    }
    Ok(views)
}

async fn latest_recipes<C: ConnectionTrait>(
    db: &C,
    author_id: i32,
    limit: u64,
) -> Result<Vec<recipe::Model>, AppError> {
    Ok(recipe::Entity::find()
        .filter(recipe::Column::AuthorId.eq(author_id))
        .order_by_desc(recipe::Column::CreatedAt)
        .order_by_desc(recipe::Column::Id)
        .limit(Some(limit))
        .all(db)
        .await?)
}
