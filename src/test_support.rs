//! Test doubles shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::db::LiveQuery;
use crate::models::{ListItem, ShoppingList};
use crate::outcome::Outcome;
use crate::shopping_lists::ShoppingListRepository;

/// In-memory repository that records writes and lets a test drive the
/// live reads by hand.
#[derive(Default)]
pub(crate) struct FakeShoppingListRepository {
    pub writes: AtomicUsize,
    pub fail_writes: AtomicBool,
    next_id: AtomicI64,
    pub last_list: Mutex<Option<ShoppingList>>,
    pub last_item: Mutex<Option<ListItem>>,
    pub last_toggle: Mutex<Option<(i64, bool)>>,
    lists_feed: Mutex<Option<mpsc::Sender<Outcome<Vec<ShoppingList>>>>>,
    list_feed: Mutex<Option<mpsc::Sender<Outcome<Option<ShoppingList>>>>>,
    items_feed: Mutex<Option<mpsc::Sender<Outcome<Vec<ListItem>>>>>,
}

impl FakeShoppingListRepository {
    pub fn failing() -> Self {
        let fake = Self::default();
        fake.fail_writes.store(true, Ordering::SeqCst);
        fake
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn lists_feed(&self) -> mpsc::Sender<Outcome<Vec<ShoppingList>>> {
        self.lists_feed.lock().unwrap().clone().expect("no subscriber yet")
    }

    pub fn list_feed(&self) -> mpsc::Sender<Outcome<Option<ShoppingList>>> {
        self.list_feed.lock().unwrap().clone().expect("no subscriber yet")
    }

    pub fn items_feed(&self) -> mpsc::Sender<Outcome<Vec<ListItem>>> {
        self.items_feed.lock().unwrap().clone().expect("no subscriber yet")
    }

    fn write<T>(&self, value: T, message: &str) -> Outcome<T> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            Outcome::error_with(anyhow::anyhow!("disk full"), message)
        } else {
            Outcome::Success(value)
        }
    }

    fn new_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn feed<T>(slot: &Mutex<Option<mpsc::Sender<T>>>) -> LiveQuery<T> {
    let (tx, live) = LiveQuery::channel();
    *slot.lock().unwrap() = Some(tx);
    live
}

#[async_trait]
impl ShoppingListRepository for FakeShoppingListRepository {
    fn get_all_shopping_lists(&self) -> LiveQuery<Outcome<Vec<ShoppingList>>> {
        feed(&self.lists_feed)
    }

    fn get_shopping_list_by_id(&self, _id: i64) -> LiveQuery<Outcome<Option<ShoppingList>>> {
        feed(&self.list_feed)
    }

    async fn create_shopping_list(&self, list: &ShoppingList) -> Outcome<i64> {
        *self.last_list.lock().unwrap() = Some(list.clone());
        self.write(self.new_id(), "Failed to create shopping list")
    }

    async fn update_shopping_list(&self, list: &ShoppingList) -> Outcome<()> {
        *self.last_list.lock().unwrap() = Some(list.clone());
        self.write((), "Failed to update shopping list")
    }

    async fn delete_shopping_list(&self, _list: &ShoppingList) -> Outcome<()> {
        self.write((), "Failed to delete shopping list")
    }

    async fn delete_shopping_list_by_id(&self, id: i64) -> Outcome<()> {
        self.write((), &format!("Failed to delete shopping list with ID: {id}"))
    }

    fn get_list_items(&self, _shopping_list_id: i64) -> LiveQuery<Outcome<Vec<ListItem>>> {
        feed(&self.items_feed)
    }

    fn get_list_item_by_id(&self, _id: i64) -> LiveQuery<Outcome<Option<ListItem>>> {
        let (_tx, live) = LiveQuery::channel();
        live
    }

    async fn add_list_item(&self, item: &ListItem) -> Outcome<i64> {
        *self.last_item.lock().unwrap() = Some(item.clone());
        self.write(self.new_id(), "Failed to add list item")
    }

    async fn add_list_items(&self, _items: &[ListItem]) -> Outcome<()> {
        self.write((), "Failed to add list items")
    }

    async fn update_list_item(&self, item: &ListItem) -> Outcome<()> {
        *self.last_item.lock().unwrap() = Some(item.clone());
        self.write((), "Failed to update list item")
    }

    async fn delete_list_item(&self, _item: &ListItem) -> Outcome<()> {
        self.write((), "Failed to delete list item")
    }

    async fn delete_list_item_by_id(&self, id: i64) -> Outcome<()> {
        self.write((), &format!("Failed to delete list item with ID: {id}"))
    }

    async fn toggle_list_item_checked(&self, id: i64, is_checked: bool) -> Outcome<()> {
        *self.last_toggle.lock().unwrap() = Some((id, is_checked));
        self.write((), "Failed to toggle list item checked state")
    }
}
