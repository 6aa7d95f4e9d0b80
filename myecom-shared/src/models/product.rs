use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::user::{User, UserId};

/// Primary key of a product.
pub type ProductId = u64;

/// Product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Catalog entry as returned by `products/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Unit price; the API sends decimals as strings.
    pub price: Decimal,
    /// Units available at the time the snapshot was fetched.
    #[serde(default)]
    pub stock: u32,
    /// Absolute URL of the product image, if one was uploaded.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Supplier that listed the product.
    #[serde(default)]
    pub supplier: Option<User>,
}

impl Product {
    /// Purchase UI is blocked when this is `false`.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// `true` when the product was listed by `user_id`.
    #[must_use]
    pub fn is_supplied_by(&self, user_id: UserId) -> bool {
        self.supplier
            .as_ref()
            .is_some_and(|supplier| supplier.id == user_id)
    }
}

/// Fields sent as multipart form data when creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub category_id: u64,
    /// Local image file to upload; omitted from the form when absent.
    pub image: Option<PathBuf>,
}

impl ProductForm {
    /// Text fields in the order the dashboard sends them.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", self.description.clone()),
            ("price", self.price.to_string()),
            ("stock", self.stock.to_string()),
            ("category_id", self.category_id.to_string()),
        ]
    }
}
