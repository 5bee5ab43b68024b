use std::future::Future;

use sqlx::SqlitePool;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::trace;

use super::{Table, TableVersions};

const BUFFER: usize = 16;

/// A query that re-delivers its result whenever the data it reads changes.
///
/// Results arrive through [`LiveQuery::next`]. Dropping the handle cancels
/// the background task.
pub struct LiveQuery<T> {
    rx: mpsc::Receiver<T>,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> LiveQuery<T> {
    pub(super) fn spawn<F, Fut>(
        pool: SqlitePool,
        mut versions: watch::Receiver<TableVersions>,
        tables: &'static [Table],
        query: F,
    ) -> Self
    where
        F: Fn(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(BUFFER);
        let task = tokio::spawn(async move {
            loop {
                // Snapshot before querying so a write racing the query
                // still triggers another run.
                let seen = *versions.borrow_and_update();
                let value = query(pool.clone()).await;
                if tx.send(value).await.is_err() {
                    return;
                }

                loop {
                    tokio::select! {
                        _ = tx.closed() => return,
                        changed = versions.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            if versions.borrow_and_update().changed_since(&seen, tables) {
                                break;
                            }
                        }
                    }
                }
                trace!(?tables, "live query re-running");
            }
        });
        Self {
            rx,
            task: Some(task),
        }
    }
}

impl<T> LiveQuery<T> {
    /// A live query fed by hand through the returned sender. Used for
    /// sources that are not backed by the store, such as test doubles.
    pub fn channel() -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(BUFFER);
        (tx, Self { rx, task: None })
    }

    /// Next result; `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`LiveQuery::next`].
    pub fn try_next(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn map<U, F>(self, f: F) -> LiveQuery<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> U + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(BUFFER);
        let mut inner = self;
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => return,
                    value = inner.next() => match value {
                        Some(v) => {
                            if tx.send(f(v)).await.is_err() {
                                return;
                            }
                        }
                        None => return,
                    },
                }
            }
        });
        LiveQuery {
            rx,
            task: Some(task),
        }
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

#[cfg(test)]
mod live_tests {
    use std::time::Duration;

    use super::*;
    use crate::db::Database;

    async fn count_lists(pool: SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM shopping_lists")
            .fetch_one(&pool)
            .await
            .unwrap_or(-1)
    }

    async fn insert_list(db: &Database, name: &str) {
        sqlx::query("INSERT INTO shopping_lists (name, createdAt, updatedAt) VALUES (?, '2024-01-01T00:00:00', '2024-01-01T00:00:00')")
            .bind(name)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn emits_initial_value_then_on_change() {
        let db = Database::in_memory().await.unwrap();
        let mut live = db.observe(&[Table::ShoppingLists], count_lists);
        assert_eq!(live.next().await, Some(0));

        insert_list(&db, "a").await;
        db.notify(Table::ShoppingLists);
        assert_eq!(live.next().await, Some(1));
    }

    #[tokio::test]
    async fn ignores_unrelated_tables() {
        let db = Database::in_memory().await.unwrap();
        let mut live = db.observe(&[Table::ShoppingLists], count_lists);
        assert_eq!(live.next().await, Some(0));

        db.notify(Table::Ingredients);
        let res = tokio::time::timeout(Duration::from_millis(50), live.next()).await;
        assert!(res.is_err(), "no re-run expected");
    }

    #[tokio::test]
    async fn map_transforms_values() {
        let db = Database::in_memory().await.unwrap();
        let mut live = db
            .observe(&[Table::ShoppingLists], count_lists)
            .map(|n| n * 10);
        assert_eq!(live.next().await, Some(0));
        insert_list(&db, "b").await;
        db.notify(Table::ShoppingLists);
        assert_eq!(live.next().await, Some(10));
    }
}
