use std::fmt::Write;

use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;

use crate::entity::{cart, ingredient, recipe_ingredient};
use crate::error::AppError;

#[derive(Debug, FromQueryResult)]
pub struct ShoppingListRow {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// One consolidated line of the shopping list. Positions start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub position: usize,
    pub name: String,
    pub amount: i64,
    pub measurement_unit: String,
}

/// Sum ingredient amounts across every recipe in the user's cart, grouped by
/// (name, unit) and ordered by name then unit.
pub async fn aggregate<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<ShoppingListItem>, AppError> {
    let rows = recipe_ingredient::Entity::find()
        .select_only()
        .column_as(ingredient::Column::Name, "name")
        .column_as(ingredient::Column::MeasurementUnit, "measurement_unit")
        .column_as(recipe_ingredient::Column::Amount.sum(), "total_amount")
        .inner_join(ingredient::Entity)
        .filter(
            recipe_ingredient::Column::RecipeId.in_subquery(
                SeaQuery::select()
                    .column(cart::Column::RecipeId)
                    .from(cart::Entity)
                    .and_where(cart::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        )
        .group_by(ingredient::Column::Name)
        .group_by(ingredient::Column::MeasurementUnit)
        .order_by_asc(ingredient::Column::Name)
        .order_by_asc(ingredient::Column::MeasurementUnit)
        .into_model::<ShoppingListRow>()
        .all(db)
        .await?;

    if rows.is_empty() {
        return Err(AppError::EmptyCart);
    }

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| ShoppingListItem {
            position: i + 1,
            name: row.name,
            amount: row.total_amount,
            measurement_unit: row.measurement_unit,
        })
        .collect())
}

/// Render as plain text, one `"{n}. {name} {amount} {unit}"` line per item.
pub fn render(items: &[ShoppingListItem]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(
            out,
            "{}. {} {} {}",
            item.position, item.name, item.amount, item.measurement_unit
        );
    }
    out
}
