use async_trait::async_trait;
use tracing::debug;

use super::repo;
use super::repo_types::{ListItemRow, ShoppingListRow};
use crate::db::{Database, LiveQuery, Table};
use crate::models::{ListItem, ShoppingList};
use crate::outcome::{from_row, from_rows, from_write, Outcome};

/// Shopping lists and their items, treated as one aggregate.
///
/// Reads are live: they re-deliver whenever the underlying rows change.
/// Writes resolve to a single outcome. Storage failures never escape as
/// errors; they come back as [`Outcome::Error`].
#[async_trait]
pub trait ShoppingListRepository: Send + Sync {
    /// Most recently updated first.
    fn get_all_shopping_lists(&self) -> LiveQuery<Outcome<Vec<ShoppingList>>>;
    fn get_shopping_list_by_id(&self, id: i64) -> LiveQuery<Outcome<Option<ShoppingList>>>;
    async fn create_shopping_list(&self, list: &ShoppingList) -> Outcome<i64>;
    async fn update_shopping_list(&self, list: &ShoppingList) -> Outcome<()>;
    async fn delete_shopping_list(&self, list: &ShoppingList) -> Outcome<()>;
    async fn delete_shopping_list_by_id(&self, id: i64) -> Outcome<()>;

    /// Ordered by category, then name.
    fn get_list_items(&self, shopping_list_id: i64) -> LiveQuery<Outcome<Vec<ListItem>>>;
    fn get_list_item_by_id(&self, id: i64) -> LiveQuery<Outcome<Option<ListItem>>>;
    async fn add_list_item(&self, item: &ListItem) -> Outcome<i64>;
    async fn add_list_items(&self, items: &[ListItem]) -> Outcome<()>;
    async fn update_list_item(&self, item: &ListItem) -> Outcome<()>;
    async fn delete_list_item(&self, item: &ListItem) -> Outcome<()>;
    async fn delete_list_item_by_id(&self, id: i64) -> Outcome<()>;
    /// Updates only the checked flag.
    async fn toggle_list_item_checked(&self, id: i64, is_checked: bool) -> Outcome<()>;
}

#[derive(Clone)]
pub struct SqliteShoppingListRepository {
    db: Database,
}

impl SqliteShoppingListRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn finish<T>(&self, written: Outcome<T>, table: Table) -> Outcome<T> {
        if written.is_success() {
            self.db.notify(table);
        }
        written
    }
}

#[async_trait]
impl ShoppingListRepository for SqliteShoppingListRepository {
    fn get_all_shopping_lists(&self) -> LiveQuery<Outcome<Vec<ShoppingList>>> {
        self.db.observe(&[Table::ShoppingLists], |pool| async move {
            from_rows::<_, ShoppingList>(repo::list_all(&pool).await, || {
                "Failed to fetch shopping lists".into()
            })
        })
    }

    fn get_shopping_list_by_id(&self, id: i64) -> LiveQuery<Outcome<Option<ShoppingList>>> {
        self.db.observe(&[Table::ShoppingLists], move |pool| async move {
            from_row::<_, ShoppingList>(repo::find_by_id(&pool, id).await, || {
                format!("Failed to fetch shopping list with ID: {id}")
            })
        })
    }

    async fn create_shopping_list(&self, list: &ShoppingList) -> Outcome<i64> {
        let row = ShoppingListRow::from(list);
        let out = from_write(repo::insert(self.db.pool(), &row).await, || {
            "Failed to create shopping list".into()
        });
        if let Outcome::Success(id) = &out {
            debug!(id, name = %list.name, "shopping list created");
        }
        self.finish(out, Table::ShoppingLists)
    }

    async fn update_shopping_list(&self, list: &ShoppingList) -> Outcome<()> {
        let row = ShoppingListRow::from(list);
        let out = from_write(repo::update(self.db.pool(), &row).await.map(drop), || {
            "Failed to update shopping list".into()
        });
        self.finish(out, Table::ShoppingLists)
    }

    async fn delete_shopping_list(&self, list: &ShoppingList) -> Outcome<()> {
        let out = from_write(repo::delete_by_id(self.db.pool(), list.id).await.map(drop), || {
            "Failed to delete shopping list".into()
        });
        self.finish(out, Table::ShoppingLists)
    }

    async fn delete_shopping_list_by_id(&self, id: i64) -> Outcome<()> {
        let out = from_write(repo::delete_by_id(self.db.pool(), id).await, || {
            format!("Failed to delete shopping list with ID: {id}")
        });
        if let Outcome::Success(n) = &out {
            debug!(id, deleted = n, "shopping list deleted");
        }
        self.finish(out.map(drop), Table::ShoppingLists)
    }

    fn get_list_items(&self, shopping_list_id: i64) -> LiveQuery<Outcome<Vec<ListItem>>> {
        self.db.observe(&[Table::ListItems], move |pool| async move {
            from_rows::<_, ListItem>(
                repo::list_items_by_list(&pool, shopping_list_id).await,
                || format!("Failed to fetch list items for shopping list ID: {shopping_list_id}"),
            )
        })
    }

    fn get_list_item_by_id(&self, id: i64) -> LiveQuery<Outcome<Option<ListItem>>> {
        self.db.observe(&[Table::ListItems], move |pool| async move {
            from_row::<_, ListItem>(repo::find_item(&pool, id).await, || {
                format!("Failed to fetch list item with ID: {id}")
            })
        })
    }

    async fn add_list_item(&self, item: &ListItem) -> Outcome<i64> {
        let row = ListItemRow::from(item);
        let out = from_write(repo::insert_item(self.db.pool(), &row).await, || {
            "Failed to add list item".into()
        });
        if let Outcome::Success(id) = &out {
            debug!(id, list_id = item.shopping_list_id, name = %item.name, "list item added");
        }
        self.finish(out, Table::ListItems)
    }

    async fn add_list_items(&self, items: &[ListItem]) -> Outcome<()> {
        let rows: Vec<ListItemRow> = items.iter().map(ListItemRow::from).collect();
        let out = from_write(repo::insert_items(self.db.pool(), &rows).await, || {
            "Failed to add list items".into()
        });
        self.finish(out, Table::ListItems)
    }

    async fn update_list_item(&self, item: &ListItem) -> Outcome<()> {
        let row = ListItemRow::from(item);
        let out = from_write(repo::update_item(self.db.pool(), &row).await.map(drop), || {
            "Failed to update list item".into()
        });
        self.finish(out, Table::ListItems)
    }

    async fn delete_list_item(&self, item: &ListItem) -> Outcome<()> {
        let out = from_write(
            repo::delete_item_by_id(self.db.pool(), item.id).await.map(drop),
            || "Failed to delete list item".into(),
        );
        self.finish(out, Table::ListItems)
    }

    async fn delete_list_item_by_id(&self, id: i64) -> Outcome<()> {
        let out = from_write(
            repo::delete_item_by_id(self.db.pool(), id).await.map(drop),
            || format!("Failed to delete list item with ID: {id}"),
        );
        self.finish(out, Table::ListItems)
    }

    async fn toggle_list_item_checked(&self, id: i64, is_checked: bool) -> Outcome<()> {
        let out = from_write(
            repo::set_item_checked(self.db.pool(), id, is_checked).await.map(drop),
            || "Failed to toggle list item checked state".into(),
        );
        self.finish(out, Table::ListItems)
    }
}
