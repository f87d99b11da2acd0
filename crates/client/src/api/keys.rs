//! Cache keys for backend resources.
//!
//! A key is the resource's request path, so the key that caches a response
//! is also the path that fetches it. Invalidating a key with
//! [`QueryCache::invalidate_prefix`](crate::cache::QueryCache::invalidate_prefix)
//! also covers its sub-resources and query-string variants.

use artisan_bazaar_core::{CartItemId, ModificationRequestId, NotificationId, ProductId};

pub const ME: &str = "/api/auth/me";
pub const LOGIN: &str = "/api/auth/login";
pub const LOGOUT: &str = "/api/auth/logout";

pub const PRODUCTS: &str = "/api/products";
pub const FEATURED_PRODUCTS: &str = "/api/products/featured";

pub const CART: &str = "/api/cart";

pub const ORDERS: &str = "/api/orders";

pub const MODIFICATION_REQUESTS: &str = "/api/product-modification-requests";
pub const BUYER_MODIFICATION_REQUESTS: &str = "/api/product-modification-requests/buyer";
pub const SELLER_MODIFICATION_REQUESTS: &str = "/api/product-modification-requests/seller";

pub const NOTIFICATIONS: &str = "/api/notifications";

pub const ADMIN_USERS: &str = "/api/admin/users";

/// Detail path for a product.
#[must_use]
pub fn product(id: ProductId) -> String {
    format!("{PRODUCTS}/{id}")
}

/// Path for one cart line.
#[must_use]
pub fn cart_item(id: CartItemId) -> String {
    format!("{CART}/{id}")
}

/// Path for one modification request.
#[must_use]
pub fn modification_request(id: ModificationRequestId) -> String {
    format!("{MODIFICATION_REQUESTS}/{id}")
}

/// Path marking a notification read.
#[must_use]
pub fn notification_read(id: NotificationId) -> String {
    format!("{NOTIFICATIONS}/{id}/read")
}

/// Admin path for removing a listing.
#[must_use]
pub fn admin_product(id: ProductId) -> String {
    format!("/api/admin/products/{id}")
}

/// Whether `key` is `prefix` itself, a sub-path of it, or a query variant of it.
///
/// Matching is segment-aware: `/api/cart` covers `/api/cart/3` and
/// `/api/cart?x=1` but not `/api/carts`.
#[must_use]
pub fn is_under(key: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    key.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_under_is_segment_aware() {
        assert!(is_under("/api/cart", CART));
        assert!(is_under("/api/cart/4", CART));
        assert!(is_under("/api/cart?expand=product", CART));
        assert!(!is_under("/api/carts", CART));
        assert!(!is_under("/api/orders", CART));
    }

    #[test]
    fn test_products_prefix_covers_featured_and_detail() {
        assert!(is_under(FEATURED_PRODUCTS, PRODUCTS));
        assert!(is_under(&product(ProductId::new(3).unwrap()), PRODUCTS));
        assert!(is_under("/api/products?category=ceramics", PRODUCTS));
    }

    #[test]
    fn test_trailing_slash_prefix() {
        assert!(is_under("/api/notifications/3/read", "/api/notifications/"));
    }
}
