use anyhow::Context;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::repo_types::{ListItemRow, ShoppingListRow};

// ---- shopping_lists ----

pub async fn list_all(db: &SqlitePool) -> anyhow::Result<Vec<ShoppingListRow>> {
    let rows = sqlx::query_as::<_, ShoppingListRow>(
        r#"
        SELECT id, name, createdAt, updatedAt
          FROM shopping_lists
         ORDER BY updatedAt DESC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list shopping lists")?;
    Ok(rows)
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<ShoppingListRow>> {
    let row = sqlx::query_as::<_, ShoppingListRow>(
        r#"
        SELECT id, name, createdAt, updatedAt
          FROM shopping_lists
         WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .with_context(|| format!("find shopping list {id}"))?;
    Ok(row)
}

/// Id 0 allocates a new row; an existing id replaces that row.
pub async fn insert(db: &SqlitePool, row: &ShoppingListRow) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT OR REPLACE INTO shopping_lists (id, name, createdAt, updatedAt)
        VALUES (NULLIF(?, 0), ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .fetch_one(db)
    .await
    .context("insert shopping list")?;
    Ok(id)
}

pub async fn update(db: &SqlitePool, row: &ShoppingListRow) -> anyhow::Result<u64> {
    let res = sqlx::query(
        r#"
        UPDATE shopping_lists
           SET name = ?, createdAt = ?, updatedAt = ?
         WHERE id = ?
        "#,
    )
    .bind(&row.name)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .bind(row.id)
    .execute(db)
    .await
    .with_context(|| format!("update shopping list {}", row.id))?;
    Ok(res.rows_affected())
}

/// Items of the list go with it (ON DELETE CASCADE).
pub async fn delete_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM shopping_lists WHERE id = ?")
        .bind(id)
        .execute(db)
        .await
        .with_context(|| format!("delete shopping list {id}"))?;
    Ok(res.rows_affected())
}

// ---- list_items ----

pub async fn list_items_by_list(
    db: &SqlitePool,
    shopping_list_id: i64,
) -> anyhow::Result<Vec<ListItemRow>> {
    let rows = sqlx::query_as::<_, ListItemRow>(
        r#"
        SELECT id, shoppingListId, name, quantity, unit, category, isChecked, recipeId
          FROM list_items
         WHERE shoppingListId = ?
         ORDER BY category, name
        "#,
    )
    .bind(shopping_list_id)
    .fetch_all(db)
    .await
    .with_context(|| format!("list items of shopping list {shopping_list_id}"))?;
    Ok(rows)
}

pub async fn find_item(db: &SqlitePool, id: i64) -> anyhow::Result<Option<ListItemRow>> {
    let row = sqlx::query_as::<_, ListItemRow>(
        r#"
        SELECT id, shoppingListId, name, quantity, unit, category, isChecked, recipeId
          FROM list_items
         WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .with_context(|| format!("find list item {id}"))?;
    Ok(row)
}

/// Works on the pool or inside a transaction.
pub async fn insert_item<'e, E>(db: E, row: &ListItemRow) -> anyhow::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT OR REPLACE INTO list_items
            (id, shoppingListId, name, quantity, unit, category, isChecked, recipeId)
        VALUES (NULLIF(?, 0), ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(row.id)
    .bind(row.shopping_list_id)
    .bind(&row.name)
    .bind(row.quantity)
    .bind(&row.unit)
    .bind(&row.category)
    .bind(row.is_checked)
    .bind(row.recipe_id) // Option<i64> → NULL allowed
    .fetch_one(db)
    .await
    .context("insert list item")?;
    Ok(id)
}

pub async fn insert_items(db: &SqlitePool, rows: &[ListItemRow]) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin tx")?;
    for row in rows {
        insert_item(&mut *tx, row).await?;
    }
    tx.commit().await.context("commit tx")?;
    Ok(())
}

pub async fn update_item(db: &SqlitePool, row: &ListItemRow) -> anyhow::Result<u64> {
    let res = sqlx::query(
        r#"
        UPDATE list_items
           SET shoppingListId = ?, name = ?, quantity = ?, unit = ?,
               category = ?, isChecked = ?, recipeId = ?
         WHERE id = ?
        "#,
    )
    .bind(row.shopping_list_id)
    .bind(&row.name)
    .bind(row.quantity)
    .bind(&row.unit)
    .bind(&row.category)
    .bind(row.is_checked)
    .bind(row.recipe_id)
    .bind(row.id)
    .execute(db)
    .await
    .with_context(|| format!("update list item {}", row.id))?;
    Ok(res.rows_affected())
}

pub async fn delete_item_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM list_items WHERE id = ?")
        .bind(id)
        .execute(db)
        .await
        .with_context(|| format!("delete list item {id}"))?;
    Ok(res.rows_affected())
}

pub async fn set_item_checked(db: &SqlitePool, id: i64, is_checked: bool) -> anyhow::Result<u64> {
    let res = sqlx::query("UPDATE list_items SET isChecked = ? WHERE id = ?")
        .bind(is_checked)
        .bind(id)
        .execute(db)
        .await
        .with_context(|| format!("set checked on list item {id}"))?;
    Ok(res.rows_affected())
}
