use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::recipes::{RecipeRepository, SqliteRecipeRepository};
use crate::shopping_lists::{
    ListDetailViewModel, ShoppingListRepository, ShoppingListUseCases, ShoppingListsViewModel,
    SqliteShoppingListRepository,
};
use crate::ui::EventReceiver;

/// Everything the app wires together at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub shopping_lists: Arc<dyn ShoppingListRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub use_cases: ShoppingListUseCases,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = Database::connect(&config.database).await?;
        Ok(Self::from_parts(db, config))
    }

    /// Fresh, empty in-memory store.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig {
            database: crate::config::DatabaseConfig::in_memory(),
        });
        let db = Database::connect(&config.database).await?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: Database, config: Arc<AppConfig>) -> Self {
        let shopping_lists = Arc::new(SqliteShoppingListRepository::new(db.clone()))
            as Arc<dyn ShoppingListRepository>;
        let recipes = Arc::new(SqliteRecipeRepository::new(db.clone())) as Arc<dyn RecipeRepository>;
        let use_cases = ShoppingListUseCases::new(shopping_lists.clone());
        Self {
            db,
            config,
            shopping_lists,
            recipes,
            use_cases,
        }
    }

    pub fn shopping_lists_view_model(&self) -> (ShoppingListsViewModel, EventReceiver) {
        ShoppingListsViewModel::new(self.use_cases.clone())
    }

    pub fn list_detail_view_model(&self, shopping_list_id: i64) -> (ListDetailViewModel, EventReceiver) {
        ListDetailViewModel::new(self.use_cases.clone(), shopping_list_id)
    }
}
