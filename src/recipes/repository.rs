use async_trait::async_trait;
use tracing::debug;

use super::repo;
use super::repo_types::{IngredientRow, RecipeRow};
use crate::db::{Database, LiveQuery, Table};
use crate::models::{Ingredient, Recipe};
use crate::outcome::{from_row, from_rows, from_write, Outcome};

/// Recipes and their ingredients. Same contract as the shopping-list
/// repository: live reads, single-outcome writes.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    fn get_all_recipes(&self) -> LiveQuery<Outcome<Vec<Recipe>>>;
    fn get_recipe_by_id(&self, id: i64) -> LiveQuery<Outcome<Option<Recipe>>>;
    async fn create_recipe(&self, recipe: &Recipe) -> Outcome<i64>;
    async fn update_recipe(&self, recipe: &Recipe) -> Outcome<()>;
    async fn delete_recipe(&self, recipe: &Recipe) -> Outcome<()>;
    /// Drops the ingredients too and detaches list items that referenced it.
    async fn delete_recipe_by_id(&self, id: i64) -> Outcome<()>;

    fn get_ingredients(&self, recipe_id: i64) -> LiveQuery<Outcome<Vec<Ingredient>>>;
    fn get_ingredient_by_id(&self, id: i64) -> LiveQuery<Outcome<Option<Ingredient>>>;
    async fn add_ingredient(&self, ingredient: &Ingredient) -> Outcome<i64>;
    async fn add_ingredients(&self, ingredients: &[Ingredient]) -> Outcome<()>;
    async fn update_ingredient(&self, ingredient: &Ingredient) -> Outcome<()>;
    async fn delete_ingredient(&self, ingredient: &Ingredient) -> Outcome<()>;
    async fn delete_ingredient_by_id(&self, id: i64) -> Outcome<()>;
}

#[derive(Clone)]
pub struct SqliteRecipeRepository {
    db: Database,
}

impl SqliteRecipeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn finish<T>(&self, written: Outcome<T>, table: Table) -> Outcome<T> {
        if written.is_success() {
            self.db.notify(table);
        }
        written
    }
}

#[async_trait]
impl RecipeRepository for SqliteRecipeRepository {
    fn get_all_recipes(&self) -> LiveQuery<Outcome<Vec<Recipe>>> {
        self.db.observe(&[Table::Recipes], |pool| async move {
            from_rows::<_, Recipe>(repo::list_all(&pool).await, || {
                "Failed to fetch recipes".into()
            })
        })
    }

    fn get_recipe_by_id(&self, id: i64) -> LiveQuery<Outcome<Option<Recipe>>> {
        self.db.observe(&[Table::Recipes], move |pool| async move {
            from_row::<_, Recipe>(repo::find_by_id(&pool, id).await, || {
                format!("Failed to fetch recipe with ID: {id}")
            })
        })
    }

    async fn create_recipe(&self, recipe: &Recipe) -> Outcome<i64> {
        let row = RecipeRow::from(recipe);
        let out = from_write(repo::insert(self.db.pool(), &row).await, || {
            "Failed to create recipe".into()
        });
        if let Outcome::Success(id) = &out {
            debug!(id, name = %recipe.name, "recipe created");
        }
        self.finish(out, Table::Recipes)
    }

    async fn update_recipe(&self, recipe: &Recipe) -> Outcome<()> {
        let row = RecipeRow::from(recipe);
        let out = from_write(repo::update(self.db.pool(), &row).await.map(drop), || {
            "Failed to update recipe".into()
        });
        self.finish(out, Table::Recipes)
    }

    async fn delete_recipe(&self, recipe: &Recipe) -> Outcome<()> {
        let out = from_write(repo::delete_by_id(self.db.pool(), recipe.id).await.map(drop), || {
            "Failed to delete recipe".into()
        });
        self.finish(out, Table::Recipes)
    }

    async fn delete_recipe_by_id(&self, id: i64) -> Outcome<()> {
        let out = from_write(repo::delete_by_id(self.db.pool(), id).await, || {
            format!("Failed to delete recipe with ID: {id}")
        });
        if let Outcome::Success(n) = &out {
            debug!(id, deleted = n, "recipe deleted");
        }
        self.finish(out.map(drop), Table::Recipes)
    }

    fn get_ingredients(&self, recipe_id: i64) -> LiveQuery<Outcome<Vec<Ingredient>>> {
        self.db.observe(&[Table::Ingredients], move |pool| async move {
            from_rows::<_, Ingredient>(repo::ingredients_by_recipe(&pool, recipe_id).await, || {
                format!("Failed to fetch ingredients for recipe ID: {recipe_id}")
            })
        })
    }

    fn get_ingredient_by_id(&self, id: i64) -> LiveQuery<Outcome<Option<Ingredient>>> {
        self.db.observe(&[Table::Ingredients], move |pool| async move {
            from_row::<_, Ingredient>(repo::find_ingredient(&pool, id).await, || {
                format!("Failed to fetch ingredient with ID: {id}")
            })
        })
    }

    async fn add_ingredient(&self, ingredient: &Ingredient) -> Outcome<i64> {
        let row = IngredientRow::from(ingredient);
        let out = from_write(repo::insert_ingredient(self.db.pool(), &row).await, || {
            "Failed to add ingredient".into()
        });
        self.finish(out, Table::Ingredients)
    }

    async fn add_ingredients(&self, ingredients: &[Ingredient]) -> Outcome<()> {
        let rows: Vec<IngredientRow> = ingredients.iter().map(IngredientRow::from).collect();
        let out = from_write(repo::insert_ingredients(self.db.pool(), &rows).await, || {
            "Failed to add ingredients".into()
        });
        self.finish(out, Table::Ingredients)
    }

    async fn update_ingredient(&self, ingredient: &Ingredient) -> Outcome<()> {
        let row = IngredientRow::from(ingredient);
        let out = from_write(
            repo::update_ingredient(self.db.pool(), &row).await.map(drop),
            || "Failed to update ingredient".into(),
        );
        self.finish(out, Table::Ingredients)
    }

    async fn delete_ingredient(&self, ingredient: &Ingredient) -> Outcome<()> {
        let out = from_write(
            repo::delete_ingredient_by_id(self.db.pool(), ingredient.id)
                .await
                .map(drop),
            || "Failed to delete ingredient".into(),
        );
        self.finish(out, Table::Ingredients)
    }

    async fn delete_ingredient_by_id(&self, id: i64) -> Outcome<()> {
        let out = from_write(
            repo::delete_ingredient_by_id(self.db.pool(), id).await.map(drop),
            || format!("Failed to delete ingredient with ID: {id}"),
        );
        self.finish(out, Table::Ingredients)
    }
}

#[cfg(test)]
mod repository_tests {
    use super::*;
    use crate::models::{Category, ListItem, ShoppingList, Unit};
    use crate::shopping_lists::{ShoppingListRepository, SqliteShoppingListRepository};

    async fn setup() -> (SqliteRecipeRepository, SqliteShoppingListRepository) {
        let db = Database::in_memory().await.expect("in-memory db");
        (
            SqliteRecipeRepository::new(db.clone()),
            SqliteShoppingListRepository::new(db),
        )
    }

    #[tokio::test]
    async fn create_update_and_read_recipe() {
        let (recipes, _) = setup().await;
        let id = recipes
            .create_recipe(&Recipe::new("Gulasch"))
            .await
            .ok()
            .unwrap();

        let mut live = recipes.get_recipe_by_id(id);
        let mut stored = live.next().await.unwrap().ok().unwrap().unwrap();
        assert_eq!(stored.servings, 1);

        stored.servings = 6;
        stored.instructions = Some("Langsam schmoren.".into());
        assert!(recipes.update_recipe(&stored).await.is_success());
        assert_eq!(live.next().await.unwrap().ok().unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn ingredients_are_ordered_and_batch_inserted() {
        let (recipes, _) = setup().await;
        let id = recipes.create_recipe(&Recipe::new("Salat")).await.ok().unwrap();
        let batch = vec![
            Ingredient::new(id, "Salz", 1.0, Unit::Pinch, Category::Spices),
            Ingredient::new(id, "Gurke", 1.0, Unit::Piece, Category::Vegetables),
            Ingredient::new(id, "Essig", 2.0, Unit::Tablespoon, Category::Other),
        ];
        assert!(recipes.add_ingredients(&batch).await.is_success());

        let mut live = recipes.get_ingredients(id);
        let names: Vec<String> = live
            .next()
            .await
            .unwrap()
            .ok()
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        // GEMUESE < GEWUERZE < SONSTIGES
        assert_eq!(names, vec!["Gurke", "Salz", "Essig"]);
    }

    #[tokio::test]
    async fn ingredient_update_and_delete() {
        let (recipes, _) = setup().await;
        let recipe = recipes.create_recipe(&Recipe::new("Tee")).await.ok().unwrap();
        let ingredient = Ingredient::new(recipe, "Minze", 1.0, Unit::Bunch, Category::Produce);
        let id = recipes.add_ingredient(&ingredient).await.ok().unwrap();

        let changed = Ingredient {
            id,
            quantity: 2.0,
            ..ingredient
        };
        assert!(recipes.update_ingredient(&changed).await.is_success());
        let mut live = recipes.get_ingredient_by_id(id);
        assert_eq!(live.next().await.unwrap().ok().unwrap(), Some(changed.clone()));

        assert!(recipes.delete_ingredient(&changed).await.is_success());
        assert_eq!(live.next().await.unwrap().ok().unwrap(), None);
    }

    #[tokio::test]
    async fn deleting_recipe_cascades_and_detaches_list_items() {
        let (recipes, lists) = setup().await;
        let recipe = recipes.create_recipe(&Recipe::new("Kuchen")).await.ok().unwrap();
        recipes
            .add_ingredient(&Ingredient::new(recipe, "Mehl", 500.0, Unit::Gram, Category::Other))
            .await
            .ok()
            .unwrap();

        let list = lists
            .create_shopping_list(&ShoppingList::new("Backen"))
            .await
            .ok()
            .unwrap();
        let mut item = ListItem::new(list, "Mehl", 500.0, Unit::Gram, Category::Other);
        item.recipe_id = Some(recipe);
        lists.add_list_item(&item).await.ok().unwrap();

        let mut items = lists.get_list_items(list);
        assert_eq!(items.next().await.unwrap().ok().unwrap()[0].recipe_id, Some(recipe));
        let mut ingredients = recipes.get_ingredients(recipe);
        assert_eq!(ingredients.next().await.unwrap().ok().unwrap().len(), 1);

        assert!(recipes.delete_recipe_by_id(recipe).await.is_success());

        assert!(ingredients.next().await.unwrap().ok().unwrap().is_empty());
        let remaining = items.next().await.unwrap().ok().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].recipe_id, None);
    }

    #[tokio::test]
    async fn ingredient_for_unknown_recipe_fails() {
        let (recipes, _) = setup().await;
        let out = recipes
            .add_ingredient(&Ingredient::new(42, "x", 1.0, Unit::Gram, Category::Other))
            .await;
        assert_eq!(out.error_message(), Some("Failed to add ingredient"));
    }
}
