//! One use case per user action. Each validates its input and then
//! delegates to exactly one repository call.

use std::sync::Arc;

use tracing::{instrument, warn};

use super::dto::{AddListItemRequest, UpdateListItemRequest};
use super::repository::ShoppingListRepository;
use crate::db::LiveQuery;
use crate::models::{self, ListItem, ShoppingList};
use crate::outcome::Outcome;

pub const BLANK_ITEM_NAME: &str = "Item name cannot be blank";
pub const NON_POSITIVE_QUANTITY: &str = "Quantity must be positive";
pub const BLANK_LIST_NAME: &str = "Shopping list name cannot be blank";

/// Trimmed name, or `None` when nothing is left.
fn clean_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Rejects items with a blank name or a quantity that is not > 0 (NaN included).
fn validate_item(name: &str, quantity: f64) -> Result<String, &'static str> {
    let name = clean_name(name).ok_or(BLANK_ITEM_NAME)?;
    if !(quantity > 0.0) {
        return Err(NON_POSITIVE_QUANTITY);
    }
    Ok(name.to_string())
}

#[derive(Clone)]
pub struct GetShoppingListsUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl GetShoppingListsUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> LiveQuery<Outcome<Vec<ShoppingList>>> {
        self.repository.get_all_shopping_lists()
    }
}

#[derive(Clone)]
pub struct GetShoppingListByIdUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl GetShoppingListByIdUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    pub fn execute(&self, id: i64) -> LiveQuery<Outcome<Option<ShoppingList>>> {
        self.repository.get_shopping_list_by_id(id)
    }
}

#[derive(Clone)]
pub struct GetListItemsUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl GetListItemsUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    pub fn execute(&self, shopping_list_id: i64) -> LiveQuery<Outcome<Vec<ListItem>>> {
        self.repository.get_list_items(shopping_list_id)
    }
}

#[derive(Clone)]
pub struct CreateShoppingListUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl CreateShoppingListUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    /// Both timestamps are set to the current time.
    #[instrument(skip(self))]
    pub async fn execute(&self, name: &str) -> Outcome<i64> {
        let Some(name) = clean_name(name) else {
            warn!("blank shopping list name");
            return Outcome::validation(BLANK_LIST_NAME);
        };
        self.repository
            .create_shopping_list(&ShoppingList::new(name))
            .await
    }
}

/// Renames a list and bumps its `updated_at`.
#[derive(Clone)]
pub struct UpdateShoppingListUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl UpdateShoppingListUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, list), fields(id = list.id))]
    pub async fn execute(&self, list: &ShoppingList, name: &str) -> Outcome<()> {
        let Some(name) = clean_name(name) else {
            warn!("blank shopping list name");
            return Outcome::validation(BLANK_LIST_NAME);
        };
        let renamed = ShoppingList {
            name: name.to_string(),
            updated_at: models::now(),
            ..list.clone()
        };
        self.repository.update_shopping_list(&renamed).await
    }
}

/// Removing a list removes its items as well.
#[derive(Clone)]
pub struct DeleteShoppingListUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl DeleteShoppingListUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: i64) -> Outcome<()> {
        self.repository.delete_shopping_list_by_id(id).await
    }
}

#[derive(Clone)]
pub struct AddListItemUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl AddListItemUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    /// New items always start unchecked.
    #[instrument(skip(self, req), fields(list_id = req.shopping_list_id))]
    pub async fn execute(&self, req: AddListItemRequest) -> Outcome<i64> {
        let name = match validate_item(&req.name, req.quantity) {
            Ok(name) => name,
            Err(message) => {
                warn!(quantity = req.quantity, reason = message, "invalid list item");
                return Outcome::validation(message);
            }
        };
        let item = ListItem {
            id: 0,
            shopping_list_id: req.shopping_list_id,
            name,
            quantity: req.quantity,
            unit: req.unit,
            category: req.category,
            is_checked: false,
            recipe_id: req.recipe_id,
        };
        self.repository.add_list_item(&item).await
    }
}

#[derive(Clone)]
pub struct UpdateListItemUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl UpdateListItemUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, req), fields(id = req.id))]
    pub async fn execute(&self, req: UpdateListItemRequest) -> Outcome<()> {
        let name = match validate_item(&req.name, req.quantity) {
            Ok(name) => name,
            Err(message) => {
                warn!(quantity = req.quantity, reason = message, "invalid list item");
                return Outcome::validation(message);
            }
        };
        let item = ListItem {
            id: req.id,
            shopping_list_id: req.shopping_list_id,
            name,
            quantity: req.quantity,
            unit: req.unit,
            category: req.category,
            is_checked: req.is_checked,
            recipe_id: req.recipe_id,
        };
        self.repository.update_list_item(&item).await
    }
}

#[derive(Clone)]
pub struct DeleteListItemUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl DeleteListItemUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: i64) -> Outcome<()> {
        self.repository.delete_list_item_by_id(id).await
    }
}

#[derive(Clone)]
pub struct ToggleListItemCheckedUseCase {
    repository: Arc<dyn ShoppingListRepository>,
}

impl ToggleListItemCheckedUseCase {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: i64, is_checked: bool) -> Outcome<()> {
        self.repository.toggle_list_item_checked(id, is_checked).await
    }
}

/// All shopping-list use cases, built over one repository.
#[derive(Clone)]
pub struct ShoppingListUseCases {
    pub get_shopping_lists: GetShoppingListsUseCase,
    pub get_shopping_list_by_id: GetShoppingListByIdUseCase,
    pub get_list_items: GetListItemsUseCase,
    pub create_shopping_list: CreateShoppingListUseCase,
    pub update_shopping_list: UpdateShoppingListUseCase,
    pub delete_shopping_list: DeleteShoppingListUseCase,
    pub add_list_item: AddListItemUseCase,
    pub update_list_item: UpdateListItemUseCase,
    pub delete_list_item: DeleteListItemUseCase,
    pub toggle_list_item_checked: ToggleListItemCheckedUseCase,
}

impl ShoppingListUseCases {
    pub fn new(repository: Arc<dyn ShoppingListRepository>) -> Self {
        Self {
            get_shopping_lists: GetShoppingListsUseCase::new(repository.clone()),
            get_shopping_list_by_id: GetShoppingListByIdUseCase::new(repository.clone()),
            get_list_items: GetListItemsUseCase::new(repository.clone()),
            create_shopping_list: CreateShoppingListUseCase::new(repository.clone()),
            update_shopping_list: UpdateShoppingListUseCase::new(repository.clone()),
            delete_shopping_list: DeleteShoppingListUseCase::new(repository.clone()),
            add_list_item: AddListItemUseCase::new(repository.clone()),
            update_list_item: UpdateListItemUseCase::new(repository.clone()),
            delete_list_item: DeleteListItemUseCase::new(repository.clone()),
            toggle_list_item_checked: ToggleListItemCheckedUseCase::new(repository),
        }
    }
}

#[cfg(test)]
mod service_tests {
    use super::*;
    use crate::models::{Category, Unit};
    use crate::test_support::FakeShoppingListRepository;

    fn fake() -> (Arc<FakeShoppingListRepository>, ShoppingListUseCases) {
        let repo = Arc::new(FakeShoppingListRepository::default());
        let use_cases = ShoppingListUseCases::new(repo.clone());
        (repo, use_cases)
    }

    fn add_req(name: &str, quantity: f64) -> AddListItemRequest {
        AddListItemRequest {
            shopping_list_id: 1,
            name: name.into(),
            quantity,
            unit: Unit::Liter,
            category: Category::Dairy,
            recipe_id: None,
        }
    }

    fn update_req(name: &str, quantity: f64) -> UpdateListItemRequest {
        UpdateListItemRequest {
            id: 5,
            shopping_list_id: 1,
            name: name.into(),
            quantity,
            unit: Unit::Gram,
            category: Category::Spices,
            is_checked: true,
            recipe_id: Some(2),
        }
    }

    #[tokio::test]
    async fn blank_names_never_reach_storage() {
        let (repo, uc) = fake();
        for name in ["", " ", "\t\n", "   "] {
            let out = uc.add_list_item.execute(add_req(name, 1.0)).await;
            assert_eq!(out.error_message(), Some(BLANK_ITEM_NAME));
            assert!(out.cause().unwrap().is_validation());

            let out = uc.create_shopping_list.execute(name).await;
            assert_eq!(out.error_message(), Some(BLANK_LIST_NAME));

            let out = uc.update_list_item.execute(update_req(name, 1.0)).await;
            assert_eq!(out.error_message(), Some(BLANK_ITEM_NAME));
        }
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn non_positive_quantities_never_reach_storage() {
        let (repo, uc) = fake();
        for q in [0.0, -0.0, -1.0, -0.001, f64::NEG_INFINITY, f64::NAN] {
            let out = uc.add_list_item.execute(add_req("Milk", q)).await;
            assert_eq!(out.error_message(), Some(NON_POSITIVE_QUANTITY));

            let out = uc.update_list_item.execute(update_req("Milk", q)).await;
            assert_eq!(out.error_message(), Some(NON_POSITIVE_QUANTITY));
        }
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn add_item_trims_and_starts_unchecked() {
        let (repo, uc) = fake();
        let out = uc.add_list_item.execute(add_req("  Milk ", 1.0)).await;
        assert!(out.ok().unwrap() > 0);

        let stored = repo.last_item.lock().unwrap().clone().unwrap();
        assert_eq!(stored.name, "Milk");
        assert!(!stored.is_checked);
        assert_eq!(stored.id, 0);
        assert_eq!(stored.unit, Unit::Liter);
        assert_eq!(repo.write_count(), 1);
    }

    #[tokio::test]
    async fn update_item_keeps_checked_and_recipe() {
        let (repo, uc) = fake();
        assert!(uc
            .update_list_item
            .execute(update_req(" Salz ", 5.0))
            .await
            .is_success());
        let stored = repo.last_item.lock().unwrap().clone().unwrap();
        assert_eq!(stored.name, "Salz");
        assert_eq!(stored.id, 5);
        assert!(stored.is_checked);
        assert_eq!(stored.recipe_id, Some(2));
    }

    #[tokio::test]
    async fn create_list_trims_and_stamps() {
        let (repo, uc) = fake();
        assert!(uc.create_shopping_list.execute("  Groceries  ").await.is_success());
        let list = repo.last_list.lock().unwrap().clone().unwrap();
        assert_eq!(list.name, "Groceries");
        assert_eq!(list.created_at, list.updated_at);
    }

    #[tokio::test]
    async fn rename_bumps_updated_only() {
        let (repo, uc) = fake();
        let original = ShoppingList::new("Old");
        assert!(uc
            .update_shopping_list
            .execute(&original, " New ")
            .await
            .is_success());
        let stored = repo.last_list.lock().unwrap().clone().unwrap();
        assert_eq!(stored.name, "New");
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.updated_at >= original.updated_at);

        let out = uc.update_shopping_list.execute(&original, " ").await;
        assert!(out.is_error());
        assert_eq!(repo.write_count(), 1);
    }

    #[tokio::test]
    async fn pass_through_use_cases_propagate_storage_errors() {
        let repo = Arc::new(FakeShoppingListRepository::failing());
        let uc = ShoppingListUseCases::new(repo.clone());

        let out = uc.delete_shopping_list.execute(3).await;
        assert_eq!(
            out.error_message(),
            Some("Failed to delete shopping list with ID: 3")
        );
        let out = uc.toggle_list_item_checked.execute(4, true).await;
        assert_eq!(
            out.error_message(),
            Some("Failed to toggle list item checked state")
        );
        assert_eq!(*repo.last_toggle.lock().unwrap(), Some((4, true)));
        assert!(uc.delete_list_item.execute(4).await.is_error());
        assert_eq!(repo.write_count(), 3);
    }
}
