use serde::{Deserialize, Serialize};

use crate::models::{Category, ListItem, ShoppingList, Unit};

/// Everything the overview screen renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListsUiState {
    pub lists: Vec<ShoppingList>,
}

/// One list with its items. `shopping_list` is `None` when the list does
/// not exist (e.g. it was deleted while open).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListDetailUiState {
    pub shopping_list: Option<ShoppingList>,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddListItemRequest {
    pub shopping_list_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub category: Category,
    #[serde(default)]
    pub recipe_id: Option<i64>, // set when taken over from a recipe
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateListItemRequest {
    pub id: i64,
    pub shopping_list_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub category: Category,
    #[serde(default)]
    pub is_checked: bool,
    #[serde(default)]
    pub recipe_id: Option<i64>,
}
