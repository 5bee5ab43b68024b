//! View-state holders for the overview and detail screens.
//!
//! Each holder publishes a persistent [`UiState`] through a `watch` channel
//! and reports the result of user actions as one-shot [`UiEvent`]s. Every
//! task it starts lives in its [`ViewModelScope`], so dropping or clearing
//! the holder cancels its subscriptions and pending writes.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument};

use super::dto::{AddListItemRequest, ListDetailUiState, ListsUiState, UpdateListItemRequest};
use super::services::ShoppingListUseCases;
use crate::models::{Category, ListItem, ShoppingList, Unit};
use crate::outcome::Outcome;
use crate::ui::{emit, event_channel, EventReceiver, Route, UiEvent, UiState, ViewModelScope};

const LOAD: &str = "load";

/// Sends the success snackbar (if any) or the failure message.
fn report<T>(events: &mpsc::UnboundedSender<UiEvent>, outcome: Outcome<T>, success: Option<&str>) {
    match outcome {
        Outcome::Success(_) => {
            if let Some(message) = success {
                emit(events, UiEvent::snackbar(message));
            }
        }
        Outcome::Error { message, .. } => emit(events, UiEvent::snackbar(message)),
        Outcome::Loading => {}
    }
}

pub struct ShoppingListsViewModel {
    use_cases: ShoppingListUseCases,
    state: Arc<watch::Sender<UiState<ListsUiState>>>,
    events: mpsc::UnboundedSender<UiEvent>,
    scope: ViewModelScope,
}

impl ShoppingListsViewModel {
    pub fn new(use_cases: ShoppingListUseCases) -> (Self, EventReceiver) {
        let (events, receiver) = event_channel();
        let (state, _) = watch::channel(UiState::Idle);
        let vm = Self {
            use_cases,
            state: Arc::new(state),
            events,
            scope: ViewModelScope::new(),
        };
        (vm, receiver)
    }

    pub fn state(&self) -> watch::Receiver<UiState<ListsUiState>> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> UiState<ListsUiState> {
        self.state.borrow().clone()
    }

    /// Subscribes to the overview. The subscription stays open and keeps
    /// the state current until the holder is cleared.
    pub fn load(&self) {
        self.state.send_replace(UiState::Loading);
        let mut live = self.use_cases.get_shopping_lists.execute();
        let state = self.state.clone();
        self.scope.launch_replacing(LOAD, async move {
            while let Some(outcome) = live.next().await {
                let next = match outcome {
                    Outcome::Success(lists) => UiState::Success(ListsUiState { lists }),
                    Outcome::Error { message, .. } => UiState::error(message),
                    Outcome::Loading => UiState::Loading,
                };
                state.send_replace(next);
            }
            debug!("shopping list overview stream ended");
        });
    }

    #[instrument(skip(self))]
    pub fn create_shopping_list(&self, name: &str) {
        let create = self.use_cases.create_shopping_list.clone();
        let events = self.events.clone();
        let name = name.to_owned();
        self.scope.launch(async move {
            let outcome = create.execute(&name).await;
            report(&events, outcome, Some("Shopping list created"));
        });
    }

    pub fn delete_shopping_list(&self, id: i64) {
        let delete = self.use_cases.delete_shopping_list.clone();
        let events = self.events.clone();
        self.scope.launch(async move {
            let outcome = delete.execute(id).await;
            report(&events, outcome, Some("Shopping list deleted"));
        });
    }

    pub fn on_list_clicked(&self, id: i64) {
        emit(&self.events, UiEvent::Navigate(Route::ListDetail(id).to_string()));
    }

    /// Cancels the subscription and any pending action.
    pub fn clear(&self) {
        self.scope.clear();
    }
}

/// Folds the latest list and items outcomes into one screen state.
///
/// A list error wins over an items error; anything short of two successes
/// is still loading.
pub fn combine(
    list: &Outcome<Option<ShoppingList>>,
    items: &Outcome<Vec<ListItem>>,
) -> UiState<ListDetailUiState> {
    match (list, items) {
        (Outcome::Error { message, .. }, _) | (_, Outcome::Error { message, .. }) => {
            UiState::error(message.clone())
        }
        (Outcome::Success(list), Outcome::Success(items)) => UiState::Success(ListDetailUiState {
            shopping_list: list.clone(),
            items: items.clone(),
        }),
        _ => UiState::Loading,
    }
}

pub struct ListDetailViewModel {
    shopping_list_id: i64,
    use_cases: ShoppingListUseCases,
    state: Arc<watch::Sender<UiState<ListDetailUiState>>>,
    events: mpsc::UnboundedSender<UiEvent>,
    scope: ViewModelScope,
}

impl ListDetailViewModel {
    pub fn new(use_cases: ShoppingListUseCases, shopping_list_id: i64) -> (Self, EventReceiver) {
        let (events, receiver) = event_channel();
        let (state, _) = watch::channel(UiState::Idle);
        let vm = Self {
            shopping_list_id,
            use_cases,
            state: Arc::new(state),
            events,
            scope: ViewModelScope::new(),
        };
        (vm, receiver)
    }

    pub fn shopping_list_id(&self) -> i64 {
        self.shopping_list_id
    }

    pub fn state(&self) -> watch::Receiver<UiState<ListDetailUiState>> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> UiState<ListDetailUiState> {
        self.state.borrow().clone()
    }

    pub fn load(&self) {
        self.state.send_replace(UiState::Loading);
        let id = self.shopping_list_id;
        let mut list_live = self.use_cases.get_shopping_list_by_id.execute(id);
        let mut items_live = self.use_cases.get_list_items.execute(id);
        let state = self.state.clone();
        self.scope.launch_replacing(LOAD, async move {
            let mut list = Outcome::Loading;
            let mut items = Outcome::Loading;
            loop {
                tokio::select! {
                    Some(next) = list_live.next() => list = next,
                    Some(next) = items_live.next() => items = next,
                    else => break,
                }
                state.send_replace(combine(&list, &items));
            }
            debug!(id, "list detail streams ended");
        });
    }

    #[instrument(skip(self, name), fields(list_id = self.shopping_list_id))]
    pub fn add_item(&self, name: &str, quantity: f64, unit: Unit, category: Category) {
        let req = AddListItemRequest {
            shopping_list_id: self.shopping_list_id,
            name: name.to_owned(),
            quantity,
            unit,
            category,
            recipe_id: None,
        };
        let add = self.use_cases.add_list_item.clone();
        let events = self.events.clone();
        self.scope.launch(async move {
            let outcome = add.execute(req).await;
            report(&events, outcome, Some("Item added"));
        });
    }

    pub fn update_item(&self, item: ListItem) {
        let req = UpdateListItemRequest {
            id: item.id,
            shopping_list_id: item.shopping_list_id,
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            category: item.category,
            is_checked: item.is_checked,
            recipe_id: item.recipe_id,
        };
        let update = self.use_cases.update_list_item.clone();
        let events = self.events.clone();
        self.scope.launch(async move {
            let outcome = update.execute(req).await;
            report(&events, outcome, Some("Item updated"));
        });
    }

    pub fn delete_item(&self, id: i64) {
        let delete = self.use_cases.delete_list_item.clone();
        let events = self.events.clone();
        self.scope.launch(async move {
            let outcome = delete.execute(id).await;
            report(&events, outcome, Some("Item deleted"));
        });
    }

    /// Only failures are reported.
    pub fn toggle_item_checked(&self, id: i64, is_checked: bool) {
        let toggle = self.use_cases.toggle_list_item_checked.clone();
        let events = self.events.clone();
        self.scope.launch(async move {
            let outcome = toggle.execute(id, is_checked).await;
            report(&events, outcome, None);
        });
    }

    pub fn navigate_back(&self) {
        emit(&self.events, UiEvent::NavigateBack);
    }

    pub fn clear(&self) {
        self.scope.clear();
    }
}
