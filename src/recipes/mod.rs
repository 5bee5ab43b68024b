mod repo;
mod repo_types;
mod repository;

pub use repository::{RecipeRepository, SqliteRecipeRepository};
