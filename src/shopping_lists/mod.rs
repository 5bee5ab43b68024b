pub mod dto;
mod repo;
mod repo_types;
mod repository;
pub mod services;
pub mod view_models;

pub use repository::{ShoppingListRepository, SqliteShoppingListRepository};
pub use services::ShoppingListUseCases;
pub use view_models::{ListDetailViewModel, ShoppingListsViewModel};
