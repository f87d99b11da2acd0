//! Product catalog endpoints.

use artisan_bazaar_core::{Product, ProductId};
use tracing::instrument;

use super::{ApiClient, keys};
use crate::error::ApiError;

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Only products in this category.
    pub category: Option<String>,
    /// Free-text search over names and descriptions.
    pub search: Option<String>,
}

impl ProductQuery {
    /// Request path (and cache key) for this listing.
    ///
    /// Parameters are emitted in a fixed order so equal queries share a key.
    #[must_use]
    pub fn path(&self) -> String {
        let params: Vec<String> = [("category", &self.category), ("search", &self.search)]
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{name}={}", urlencoding::encode(v)))
            })
            .collect();

        if params.is_empty() {
            keys::PRODUCTS.to_string()
        } else {
            format!("{}?{}", keys::PRODUCTS, params.join("&"))
        }
    }
}

impl ApiClient {
    /// Products highlighted on the landing page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get(keys::FEATURED_PRODUCTS).await
    }

    /// Product listing, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        self.get(&query.path()).await
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 404 if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get(&keys::product(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_is_bare_listing() {
        assert_eq!(ProductQuery::default().path(), "/api/products");
    }

    #[test]
    fn test_query_params_are_encoded_and_ordered() {
        let query = ProductQuery {
            search: Some("oak & ash".to_string()),
            category: Some("woodwork".to_string()),
        };
        assert_eq!(
            query.path(),
            "/api/products?category=woodwork&search=oak%20%26%20ash"
        );
    }

    #[test]
    fn test_blank_params_are_dropped() {
        let query = ProductQuery {
            category: Some("  ".to_string()),
            search: None,
        };
        assert_eq!(query.path(), "/api/products");
    }
}
