use sqlx::FromRow;

use crate::db::timestamp;
use crate::models::{Ingredient, Recipe};
use crate::outcome::AppError;

#[derive(Debug, Clone, PartialEq, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct RecipeRow {
    pub id: i64,
    pub name: String,
    pub instructions: Option<String>,
    pub servings: i32,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct IngredientRow {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
}

impl From<&Recipe> for RecipeRow {
    fn from(r: &Recipe) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            instructions: r.instructions.clone(),
            servings: r.servings,
            image_url: r.image_url.clone(),
            created_at: timestamp::encode(r.created_at),
            updated_at: timestamp::encode(r.updated_at),
        }
    }
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = AppError;

    fn try_from(r: RecipeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            instructions: r.instructions,
            servings: r.servings,
            image_url: r.image_url,
            created_at: timestamp::decode(&r.created_at)?,
            updated_at: timestamp::decode(&r.updated_at)?,
        })
    }
}

impl From<&Ingredient> for IngredientRow {
    fn from(i: &Ingredient) -> Self {
        Self {
            id: i.id,
            recipe_id: i.recipe_id,
            name: i.name.clone(),
            quantity: i.quantity,
            unit: i.unit.as_str().to_string(),
            category: i.category.as_str().to_string(),
        }
    }
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = AppError;

    fn try_from(r: IngredientRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            recipe_id: r.recipe_id,
            name: r.name,
            quantity: r.quantity,
            unit: r.unit.parse()?,
            category: r.category.parse()?,
        })
    }
}
