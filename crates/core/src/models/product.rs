//! Product listings.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, UserId};

/// A seller's product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category: Option<String>,
    /// Image URLs; the first one is the card thumbnail.
    #[serde(default)]
    pub images: Vec<String>,
    /// Units available for purchase.
    #[serde(default)]
    pub stock: u32,
    pub seller_id: UserId,
    #[serde(default)]
    pub seller_name: Option<String>,
    /// Average review rating on a 0-5 scale.
    #[serde(default)]
    pub rating: Option<f64>,
}

impl Product {
    /// Thumbnail image, if any.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
