//! Product entity and the inputs used to create or edit it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CatalogError, Category, Money, ProductId, Result};

/// Maximum length of a product name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Highest accepted price: ten digits of cents ($99,999,999.99).
pub const MAX_PRICE_CENTS: i64 = 9_999_999_999;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Current unit price. Carts never snapshot it.
    pub price: Money,
    pub category: Category,
    /// Units currently on hand.
    pub inventory: u32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a product from validated fields.
    pub fn from_new(id: ProductId, new: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            category: new.category,
            inventory: new.inventory,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if at least one unit is in stock.
    pub fn is_available(&self) -> bool {
        self.inventory > 0
    }

    /// One-line summary of the product.
    pub fn details(&self) -> String {
        format!("{} - {} - {}", self.name, self.description, self.price)
    }

    pub(crate) fn apply(&mut self, changes: NewProduct, now: DateTime<Utc>) {
        self.name = changes.name;
        self.description = changes.description;
        self.price = changes.price;
        self.category = changes.category;
        self.inventory = changes.inventory;
        self.image_url = changes.image_url;
        self.updated_at = now;
    }
}

/// Editable product fields, used for both creation and full updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub category: Category,
    #[serde(default)]
    pub inventory: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Creates product fields with an empty description and no image.
    pub fn new(name: impl Into<String>, price: Money, category: Category, inventory: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category,
            inventory,
            image_url: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks the fields and trims the name.
    pub fn validate(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(CatalogError::InvalidProduct("name is required".to_string()));
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(CatalogError::InvalidProduct(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if self.price.is_negative() {
            return Err(CatalogError::InvalidProduct(
                "price must not be negative".to_string(),
            ));
        }
        if self.price.cents() > MAX_PRICE_CENTS {
            return Err(CatalogError::InvalidProduct(format!(
                "price must be at most {}",
                Money::from_cents(MAX_PRICE_CENTS)
            )));
        }
        Ok(self)
    }
}

/// Filter applied when listing products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    pub category: Option<Category>,
}

impl ProductFilter {
    /// Lists every product.
    pub fn all() -> Self {
        Self::default()
    }

    /// Lists products of one category.
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
        }
    }

    /// Returns true if the product passes the filter.
    pub fn matches(&self, product: &Product) -> bool {
        self.category.is_none_or(|c| c == product.category)
    }
}
