//! Building blocks shared by the view-state holders: the persistent
//! [`UiState`], one-shot [`UiEvent`]s and the task scope tying background
//! work to a holder's lifetime.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UiState<T> {
    /// Nothing requested yet.
    Idle,
    Loading,
    Success(T),
    Error { message: String },
}

impl<T> UiState<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Transient effects, delivered once to a single consumer and never replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UiEvent {
    ShowSnackbar {
        message: String,
        action_label: Option<String>,
    },
    ShowToast(String),
    Navigate(String),
    NavigateBack,
    NavigateUp,
    PopUpTo { route: String, inclusive: bool },
}

impl UiEvent {
    pub fn snackbar(message: impl Into<String>) -> Self {
        Self::ShowSnackbar {
            message: message.into(),
            action_label: None,
        }
    }
}

/// Navigation destinations addressed by events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ShoppingLists,
    ListDetail(i64),
    Recipes,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::ShoppingLists => f.write_str("shopping_lists"),
            Route::ListDetail(id) => write!(f, "list_detail/{id}"),
            Route::Recipes => f.write_str("recipes"),
        }
    }
}

pub type EventReceiver = mpsc::UnboundedReceiver<UiEvent>;

pub(crate) fn event_channel() -> (mpsc::UnboundedSender<UiEvent>, EventReceiver) {
    mpsc::unbounded_channel()
}

pub(crate) fn emit(events: &mpsc::UnboundedSender<UiEvent>, event: UiEvent) {
    if events.send(event).is_err() {
        debug!("event receiver gone; dropping ui event");
    }
}

#[derive(Default)]
struct ScopeInner {
    tasks: JoinSet<()>,
    keyed: HashMap<&'static str, AbortHandle>,
    cleared: bool,
}

/// Owns every task a view-state holder starts. Clearing the scope, or
/// dropping it, aborts all of them.
///
/// Launching requires a running tokio runtime.
#[derive(Default)]
pub struct ViewModelScope {
    inner: Mutex<ScopeInner>,
}

impl ViewModelScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScopeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn launch<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.cleared {
            debug!("scope cleared; not launching task");
            return;
        }
        // Reap finished tasks so the set does not grow without bound.
        while inner.tasks.try_join_next().is_some() {}
        inner.tasks.spawn(fut);
    }

    /// Like [`ViewModelScope::launch`], but first aborts the task previously
    /// launched under the same key.
    pub fn launch_replacing<F>(&self, key: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.cleared {
            debug!(key, "scope cleared; not launching task");
            return;
        }
        if let Some(previous) = inner.keyed.remove(key) {
            previous.abort();
        }
        while inner.tasks.try_join_next().is_some() {}
        let handle = inner.tasks.spawn(fut);
        inner.keyed.insert(key, handle);
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.cleared = true;
        inner.keyed.clear();
        inner.tasks.abort_all();
    }

    pub fn is_cleared(&self) -> bool {
        self.lock().cleared
    }
}

#[cfg(test)]
mod ui_tests {
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;

    #[test]
    fn route_paths() {
        assert_eq!(Route::ListDetail(7).to_string(), "list_detail/7");
        assert_eq!(Route::ShoppingLists.to_string(), "shopping_lists");
    }

    #[test]
    fn ui_state_accessors() {
        let s: UiState<u8> = UiState::error("boom");
        assert!(s.is_error());
        assert_eq!(s.error_message(), Some("boom"));
        assert_eq!(s.data(), None);
        assert_eq!(UiState::Success(3).data(), Some(&3));
        assert!(UiState::<u8>::Loading.is_loading());
    }

    #[tokio::test]
    async fn clear_aborts_running_tasks() {
        let scope = ViewModelScope::new();
        let (tx, rx) = oneshot::channel::<()>();
        scope.launch(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = tx.send(());
        });
        scope.clear();
        // The sender is dropped by the abort, never used.
        assert!(rx.await.is_err());
        assert!(scope.is_cleared());
    }

    #[tokio::test]
    async fn launch_after_clear_is_ignored() {
        let scope = ViewModelScope::new();
        scope.clear();
        let (tx, rx) = oneshot::channel::<()>();
        scope.launch(async move {
            let _ = tx.send(());
        });
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn launch_replacing_aborts_previous() {
        let scope = ViewModelScope::new();
        let (first_tx, first_rx) = oneshot::channel::<()>();
        scope.launch_replacing("load", async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = first_tx.send(());
        });
        let (second_tx, second_rx) = oneshot::channel::<()>();
        scope.launch_replacing("load", async move {
            let _ = second_tx.send(());
        });
        assert!(first_rx.await.is_err());
        assert!(second_rx.await.is_ok());
    }
}
