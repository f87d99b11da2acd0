//! Product cards and the catalog reads behind them.

use artisan_bazaar_core::{AddToCart, CartItem, Product, ProductId};
use tracing::instrument;

use super::{ListState, load_list, mutation};
use crate::api::{ProductQuery, keys};
use crate::error::{Notice, ViewError, add_breadcrumb};
use crate::state::AppState;

/// At or below this many units a card shows a low-stock hint.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Stock hint shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockState {
    InStock,
    LowStock(u32),
    OutOfStock,
}

/// A product as shown in a grid, plus its local UI state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    product: Product,
    liked: bool,
}

impl ProductCard {
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            liked: false,
        }
    }

    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Price formatted for display.
    #[must_use]
    pub fn price_label(&self) -> String {
        self.product.price.to_string()
    }

    /// "by <seller>" when the listing names its seller.
    #[must_use]
    pub fn seller_label(&self) -> Option<String> {
        self.product
            .seller_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| format!("by {name}"))
    }

    #[must_use]
    pub const fn stock(&self) -> StockState {
        match self.product.stock {
            0 => StockState::OutOfStock,
            n if n <= LOW_STOCK_THRESHOLD => StockState::LowStock(n),
            _ => StockState::InStock,
        }
    }

    /// Placeholder "featured" badge until the backend provides a flag.
    #[must_use]
    pub const fn is_featured(&self) -> bool {
        self.product.id.as_i64() % 3 == 0
    }

    /// Whether the heart is filled. Local only; resets on reload.
    #[must_use]
    pub const fn liked(&self) -> bool {
        self.liked
    }

    /// Flip the like toggle and return the new value. Nothing is sent to
    /// the backend.
    pub const fn toggle_like(&mut self) -> bool {
        self.liked = !self.liked;
        self.liked
    }

    /// Validate an add-to-cart quantity against stock.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::ValidationFailed` for zero, or more than in stock.
    pub fn add_to_cart_request(&self, quantity: u32) -> Result<AddToCart, ViewError> {
        if quantity == 0 {
            return Err(ViewError::ValidationFailed(
                "Quantity must be at least 1.".to_string(),
            ));
        }
        match self.product.stock {
            0 => Err(ViewError::ValidationFailed(format!(
                "{} is out of stock.",
                self.product.name
            ))),
            stock if quantity > stock => Err(ViewError::ValidationFailed(format!(
                "Only {stock} left in stock."
            ))),
            _ => Ok(AddToCart {
                product_id: self.product.id,
                quantity,
            }),
        }
    }
}

/// Cards for the landing page.
pub async fn featured(state: &AppState) -> ListState<ProductCard> {
    let api = state.api().clone();
    let products = load_list(state, keys::FEATURED_PRODUCTS, move || async move {
        api.featured_products().await
    })
    .await;
    into_cards(products)
}

/// Cards for a (possibly filtered) catalog listing.
pub async fn catalog(state: &AppState, query: &ProductQuery) -> ListState<ProductCard> {
    let api = state.api().clone();
    let owned = query.clone();
    let products = load_list(state, &query.path(), move || async move {
        api.products(&owned).await
    })
    .await;
    into_cards(products)
}

/// One product for a detail page.
///
/// # Errors
///
/// Returns `ViewError::OperationFailed` if the product cannot be loaded.
pub async fn detail(state: &AppState, id: ProductId) -> Result<ProductCard, ViewError> {
    let api = state.api().clone();
    let cache = state.cache();
    let result = cache
        .fetch(
            &keys::product(id),
            move || async move { api.product(id).await },
            cache.default_options(),
        )
        .await;

    state
        .session()
        .observe(result)
        .map(|product| ProductCard::new(product.as_ref().clone()))
        .map_err(|e| ViewError::from_api(&e))
}

/// Add `quantity` of the card's product to the cart.
///
/// Quantity is validated before any request; on success the cart is
/// invalidated.
///
/// # Errors
///
/// Returns `ViewError::ValidationFailed` without contacting the backend, or
/// the translated backend error.
#[instrument(skip(state, card), fields(product_id = %card.product().id))]
pub async fn add_to_cart(
    state: &AppState,
    card: &ProductCard,
    quantity: u32,
) -> Result<Notice, ViewError> {
    let request = card.add_to_cart_request(quantity)?;
    let api = state.api();

    let _line: CartItem = mutation(state, &[keys::CART], api.add_to_cart(&request)).await?;

    let product_id = request.product_id.to_string();
    add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
    Ok(Notice::success(format!("Added {} to your cart.", card.product().name)))
}

fn into_cards(products: ListState<Product>) -> ListState<ProductCard> {
    match products {
        ListState::Loading => ListState::Loading,
        ListState::Empty => ListState::Empty,
        ListState::Ready(items) => ListState::Ready(items.into_iter().map(ProductCard::new).collect()),
        ListState::Failed { error, stale } => ListState::Failed {
            error,
            stale: stale.into_iter().map(ProductCard::new).collect(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use artisan_bazaar_core::{Price, UserId};

    use super::*;

    fn product(id: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            name: "Walnut Bowl".to_string(),
            description: String::new(),
            price: Price::from_cents(4200),
            category: Some("woodwork".to_string()),
            images: Vec::new(),
            stock,
            seller_id: UserId::new(2).unwrap(),
            seller_name: Some("Oren Pike".to_string()),
            rating: None,
        }
    }

    #[test]
    fn test_labels() {
        let card = ProductCard::new(product(1, 10));
        assert_eq!(card.price_label(), "$42.00");
        assert_eq!(card.seller_label().as_deref(), Some("by Oren Pike"));
        assert_eq!(card.stock(), StockState::InStock);
    }

    #[test]
    fn test_stock_states() {
        assert_eq!(ProductCard::new(product(1, 0)).stock(), StockState::OutOfStock);
        assert_eq!(ProductCard::new(product(1, 5)).stock(), StockState::LowStock(5));
        assert_eq!(ProductCard::new(product(1, 6)).stock(), StockState::InStock);
    }

    #[test]
    fn test_featured_placeholder() {
        assert!(ProductCard::new(product(3, 1)).is_featured());
        assert!(ProductCard::new(product(9, 1)).is_featured());
        assert!(!ProductCard::new(product(4, 1)).is_featured());
    }

    #[test]
    fn test_like_toggle_is_local_and_starts_off() {
        let mut card = ProductCard::new(product(1, 1));
        assert!(!card.liked());
        assert!(card.toggle_like());
        assert!(!card.toggle_like());
        // A fresh card (a reload) forgets the toggle.
        assert!(!ProductCard::new(card.product().clone()).liked());
    }

    #[test]
    fn test_quantity_validation() {
        let card = ProductCard::new(product(1, 3));
        assert!(matches!(
            card.add_to_cart_request(0),
            Err(ViewError::ValidationFailed(_))
        ));
        assert_eq!(
            card.add_to_cart_request(4),
            Err(ViewError::ValidationFailed("Only 3 left in stock.".to_string()))
        );
        assert_eq!(
            card.add_to_cart_request(3).unwrap(),
            AddToCart {
                product_id: ProductId::new(1).unwrap(),
                quantity: 3
            }
        );
        assert!(ProductCard::new(product(1, 0)).add_to_cart_request(1).is_err());
    }
}
