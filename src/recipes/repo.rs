use anyhow::Context;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::repo_types::{IngredientRow, RecipeRow};

// ---- recipes ----

pub async fn list_all(db: &SqlitePool) -> anyhow::Result<Vec<RecipeRow>> {
    let rows = sqlx::query_as::<_, RecipeRow>(
        r#"
        SELECT id, name, instructions, servings, imageUrl, createdAt, updatedAt
          FROM recipes
         ORDER BY updatedAt DESC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list recipes")?;
    Ok(rows)
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<RecipeRow>> {
    let row = sqlx::query_as::<_, RecipeRow>(
        r#"
        SELECT id, name, instructions, servings, imageUrl, createdAt, updatedAt
          FROM recipes
         WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .with_context(|| format!("find recipe {id}"))?;
    Ok(row)
}

pub async fn insert(db: &SqlitePool, row: &RecipeRow) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT OR REPLACE INTO recipes
            (id, name, instructions, servings, imageUrl, createdAt, updatedAt)
        VALUES (NULLIF(?, 0), ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.instructions)
    .bind(row.servings)
    .bind(&row.image_url)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .fetch_one(db)
    .await
    .context("insert recipe")?;
    Ok(id)
}

pub async fn update(db: &SqlitePool, row: &RecipeRow) -> anyhow::Result<u64> {
    let res = sqlx::query(
        r#"
        UPDATE recipes
           SET name = ?, instructions = ?, servings = ?, imageUrl = ?,
               createdAt = ?, updatedAt = ?
         WHERE id = ?
        "#,
    )
    .bind(&row.name)
    .bind(&row.instructions)
    .bind(row.servings)
    .bind(&row.image_url)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .bind(row.id)
    .execute(db)
    .await
    .with_context(|| format!("update recipe {}", row.id))?;
    Ok(res.rows_affected())
}

/// Ingredients are removed; list items taken from the recipe keep
/// existing with `recipeId` cleared.
pub async fn delete_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await
        .with_context(|| format!("delete recipe {id}"))?;
    Ok(res.rows_affected())
}

// ---- ingredients ----

pub async fn ingredients_by_recipe(
    db: &SqlitePool,
    recipe_id: i64,
) -> anyhow::Result<Vec<IngredientRow>> {
    let rows = sqlx::query_as::<_, IngredientRow>(
        r#"
        SELECT id, recipeId, name, quantity, unit, category
          FROM ingredients
         WHERE recipeId = ?
         ORDER BY category, name
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await
    .with_context(|| format!("list ingredients of recipe {recipe_id}"))?;
    Ok(rows)
}

pub async fn find_ingredient(db: &SqlitePool, id: i64) -> anyhow::Result<Option<IngredientRow>> {
    let row = sqlx::query_as::<_, IngredientRow>(
        r#"
        SELECT id, recipeId, name, quantity, unit, category
          FROM ingredients
         WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .with_context(|| format!("find ingredient {id}"))?;
    Ok(row)
}

pub async fn insert_ingredient<'e, E>(db: E, row: &IngredientRow) -> anyhow::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT OR REPLACE INTO ingredients (id, recipeId, name, quantity, unit, category)
        VALUES (NULLIF(?, 0), ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(row.id)
    .bind(row.recipe_id)
    .bind(&row.name)
    .bind(row.quantity)
    .bind(&row.unit)
    .bind(&row.category)
    .fetch_one(db)
    .await
    .context("insert ingredient")?;
    Ok(id)
}

pub async fn insert_ingredients(db: &SqlitePool, rows: &[IngredientRow]) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin tx")?;
    for row in rows {
        insert_ingredient(&mut *tx, row).await?;
    }
    tx.commit().await.context("commit tx")?;
    Ok(())
}

pub async fn update_ingredient(db: &SqlitePool, row: &IngredientRow) -> anyhow::Result<u64> {
    let res = sqlx::query(
        r#"
        UPDATE ingredients
           SET recipeId = ?, name = ?, quantity = ?, unit = ?, category = ?
         WHERE id = ?
        "#,
    )
    .bind(row.recipe_id)
    .bind(&row.name)
    .bind(row.quantity)
    .bind(&row.unit)
    .bind(&row.category)
    .bind(row.id)
    .execute(db)
    .await
    .with_context(|| format!("update ingredient {}", row.id))?;
    Ok(res.rows_affected())
}

pub async fn delete_ingredient_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM ingredients WHERE id = ?")
        .bind(id)
        .execute(db)
        .await
        .with_context(|| format!("delete ingredient {id}"))?;
    Ok(res.rows_affected())
}
