use sqlx::FromRow;

use crate::db::timestamp;
use crate::models::{ListItem, ShoppingList};
use crate::outcome::AppError;

/// `shopping_lists` row.
#[derive(Debug, Clone, PartialEq, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct ShoppingListRow {
    pub id: i64,
    pub name: String,
    pub created_at: String, // ISO-8601 local date-time
    pub updated_at: String,
}

/// `list_items` row. Enums are stored by symbolic name.
#[derive(Debug, Clone, PartialEq, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct ListItemRow {
    pub id: i64,
    pub shopping_list_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    pub is_checked: bool,
    pub recipe_id: Option<i64>,
}

impl From<&ShoppingList> for ShoppingListRow {
    fn from(l: &ShoppingList) -> Self {
        Self {
            id: l.id,
            name: l.name.clone(),
            created_at: timestamp::encode(l.created_at),
            updated_at: timestamp::encode(l.updated_at),
        }
    }
}

impl TryFrom<ShoppingListRow> for ShoppingList {
    type Error = AppError;

    fn try_from(r: ShoppingListRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            created_at: timestamp::decode(&r.created_at)?,
            updated_at: timestamp::decode(&r.updated_at)?,
        })
    }
}

impl From<&ListItem> for ListItemRow {
    fn from(i: &ListItem) -> Self {
        Self {
            id: i.id,
            shopping_list_id: i.shopping_list_id,
            name: i.name.clone(),
            quantity: i.quantity,
            unit: i.unit.as_str().to_string(),
            category: i.category.as_str().to_string(),
            is_checked: i.is_checked,
            recipe_id: i.recipe_id,
        }
    }
}

impl TryFrom<ListItemRow> for ListItem {
    type Error = AppError;

    fn try_from(r: ListItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            shopping_list_id: r.shopping_list_id,
            name: r.name,
            quantity: r.quantity,
            unit: r.unit.parse()?,
            category: r.category.parse()?,
            is_checked: r.is_checked,
            recipe_id: r.recipe_id,
        })
    }
}
