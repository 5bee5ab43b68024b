pub mod config;
pub mod db;
pub mod models;
pub mod outcome;
pub mod recipes;
pub mod shopping_lists;
pub mod state;
pub mod telemetry;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;
