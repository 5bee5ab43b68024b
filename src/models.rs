use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::outcome::AppError;

/// Current local wall-clock time. Falls back to UTC when the local offset
/// cannot be determined (e.g. in a multi-threaded process on some Unixes).
pub fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64, // 0 until persisted
    pub name: String,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

impl ShoppingList {
    pub fn new(name: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: 0,
            name: name.into(),
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: i64,
    pub shopping_list_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub category: Category,
    pub is_checked: bool,
    /// Set when the item was taken over from a recipe.
    pub recipe_id: Option<i64>,
}

impl ListItem {
    pub fn new(
        shopping_list_id: i64,
        name: impl Into<String>,
        quantity: f64,
        unit: Unit,
        category: Category,
    ) -> Self {
        Self {
            id: 0,
            shopping_list_id,
            name: name.into(),
            quantity,
            unit,
            category,
            is_checked: false,
            recipe_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub instructions: Option<String>,
    pub servings: i32,
    pub image_url: Option<String>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: 0,
            name: name.into(),
            instructions: None,
            servings: 1,
            image_url: None,
            created_at: ts,
            updated_at: ts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub category: Category,
}

impl Ingredient {
    pub fn new(
        recipe_id: i64,
        name: impl Into<String>,
        quantity: f64,
        unit: Unit,
        category: Category,
    ) -> Self {
        Self {
            id: 0,
            recipe_id,
            name: name.into(),
            quantity,
            unit,
            category,
        }
    }
}

/// Generates a closed enum persisted by symbolic name, with a display label.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $stored:literal, $label:literal;)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $stored)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Name written to the store.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $stored,)+
                }
            }

            pub fn display_name(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($stored => Ok($name::$variant),)+
                    other => Err(AppError::Decode(format!(
                        concat!("unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display_name())
            }
        }
    };
}

labeled_enum! {
    /// Aisle an item or ingredient belongs to.
    Category {
        Produce => "OBST", "Obst";
        Vegetables => "GEMUESE", "Gemüse";
        Meat => "FLEISCH", "Fleisch";
        Fish => "FISCH", "Fisch";
        Dairy => "MILCHPRODUKTE", "Milchprodukte";
        Bakery => "BACKWAREN", "Backwaren";
        Beverages => "GETRAENKE", "Getränke";
        Sweets => "SUESSIGKEITEN", "Süßigkeiten";
        CannedGoods => "KONSERVEN", "Konserven";
        Frozen => "TIEFKUEHL", "Tiefkühl";
        Spices => "GEWUERZE", "Gewürze";
        Other => "SONSTIGES", "Sonstiges";
    }
}

labeled_enum! {
    Unit {
        Gram => "GRAMM", "g";
        Kilogram => "KILOGRAMM", "kg";
        Milliliter => "MILLILITER", "ml";
        Liter => "LITER", "l";
        Piece => "STUECK", "Stück";
        Package => "PACKUNG", "Packung";
        Can => "DOSE", "Dose";
        Bunch => "BUND", "Bund";
        Pinch => "PRISE", "Prise";
        Tablespoon => "ESSLOEFFEL", "EL";
        Teaspoon => "TEELOEFFEL", "TL";
    }
}
