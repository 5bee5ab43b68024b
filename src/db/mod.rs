use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

mod live;
pub mod timestamp;

pub use live::LiveQuery;

/// Tables of the local store, used to scope change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    ShoppingLists,
    ListItems,
    Recipes,
    Ingredients,
}

impl Table {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            Table::ShoppingLists => 0,
            Table::ListItems => 1,
            Table::Recipes => 2,
            Table::Ingredients => 3,
        }
    }

    /// The table itself plus every table its foreign-key actions can touch.
    pub fn with_dependents(self) -> &'static [Table] {
        match self {
            Table::ShoppingLists => &[Table::ShoppingLists, Table::ListItems],
            Table::ListItems => &[Table::ListItems],
            Table::Recipes => &[Table::Recipes, Table::Ingredients, Table::ListItems],
            Table::Ingredients => &[Table::Ingredients],
        }
    }
}

/// Per-table write counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableVersions([u64; Table::COUNT]);

impl TableVersions {
    fn bump(&mut self, tables: &[Table]) {
        for t in tables {
            self.0[t.index()] = self.0[t.index()].wrapping_add(1);
        }
    }

    fn changed_since(&self, earlier: &TableVersions, tables: &[Table]) -> bool {
        tables
            .iter()
            .any(|t| self.0[t.index()] != earlier.0[t.index()])
    }
}

/// Handle to the local store: a connection pool plus the invalidation
/// tracker that drives live queries. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    versions: Arc<watch::Sender<TableVersions>>,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .with_context(|| format!("parse database url {}", config.url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        // An in-memory store lives as long as its connection, so the pool
        // must never recycle it.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;

        info!(url = %config.url, max_connections = config.max_connections, "database ready");
        Ok(Self::from_pool(pool))
    }

    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect(&DatabaseConfig::in_memory()).await
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        let (tx, _rx) = watch::channel(TableVersions::default());
        Self {
            pool,
            versions: Arc::new(tx),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Records a committed write. Every live query observing one of the
    /// tables re-runs.
    pub fn notify(&self, table: Table) {
        let tables = table.with_dependents();
        self.versions.send_modify(|v| v.bump(tables));
        debug!(?tables, "tables invalidated");
    }

    /// Runs `query` now and again after every write to one of `tables`,
    /// until the returned [`LiveQuery`] is dropped.
    pub fn observe<T, F, Fut>(&self, tables: &'static [Table], query: F) -> LiveQuery<T>
    where
        T: Send + 'static,
        F: Fn(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        LiveQuery::spawn(self.pool.clone(), self.versions.subscribe(), tables, query)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
