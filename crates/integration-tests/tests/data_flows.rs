//! Integration tests for cached reads and the writes that invalidate them.
//!
//! Hit counters on the mock backend show exactly when the cache went to the
//! network.
//!
//! Run with: cargo test -p artisan-bazaar-integration-tests --test data_flows

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use artisan_bazaar_client::ViewError;
use artisan_bazaar_client::api::{ProductQuery, keys};
use artisan_bazaar_client::views::modification_requests::{self, RequestForm, ReviewForm};
use artisan_bazaar_client::views::orders::StatusFilter;
use artisan_bazaar_client::views::product_card::{self, ProductCard, StockState};
use artisan_bazaar_client::views::{ListState, admin, cart, notifications, orders};
use artisan_bazaar_core::{
    ModificationDecision, NotificationId, OrderStatus, ProductId, RequestStatus, Role, UserId,
};
use artisan_bazaar_integration_tests::{ADMIN_EMAIL, BUYER_EMAIL, MockBackend, SELLER_EMAIL};

fn product_id(id: i64) -> ProductId {
    ProductId::new(id).unwrap()
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_catalog_filters_by_category() {
    let backend = MockBackend::start().await;
    let state = backend.client();

    let query = ProductQuery {
        category: Some("ceramics".to_string()),
        ..ProductQuery::default()
    };
    let cards = product_card::catalog(&state, &query).await;

    let names: Vec<&str> = cards.items().iter().map(|c| c.product().name.as_str()).collect();
    assert_eq!(names, ["Stoneware Mug", "Porcelain Vase"]);
}

#[tokio::test]
async fn test_detail_reports_stock() {
    let backend = MockBackend::start().await;
    let state = backend.client();

    let apron = product_card::detail(&state, product_id(3)).await.unwrap();
    let board = product_card::detail(&state, product_id(4)).await.unwrap();

    assert_eq!(apron.stock(), StockState::LowStock(2));
    assert_eq!(board.stock(), StockState::OutOfStock);
    assert_eq!(apron.seller_label().as_deref(), Some("by Oren Pike"));
}

#[tokio::test]
async fn test_missing_product_is_an_operation_failure() {
    let backend = MockBackend::start().await;
    let state = backend.client();

    let result = product_card::detail(&state, product_id(404)).await;

    assert_eq!(
        result.unwrap_err(),
        ViewError::OperationFailed("Product not found".to_string())
    );
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_concurrent_cart_loads_share_one_request() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    let (a, b, c) = tokio::join!(cart::load(&state), cart::load(&state), cart::load(&state));
    let again = cart::load(&state).await;

    assert_eq!(backend.hits("GET", keys::CART), 1);
    for view in [a, b, c, again] {
        assert_eq!(view.items, ListState::Empty);
        assert!(!view.can_checkout());
    }
}

#[tokio::test]
async fn test_add_to_cart_invalidates_cart() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    assert_eq!(cart::load(&state).await.items, ListState::Empty);

    let card = product_card::detail(&state, product_id(1)).await.unwrap();
    let notice = product_card::add_to_cart(&state, &card, 2).await.unwrap();
    assert_eq!(notice.message, "Added Walnut Bowl to your cart.");

    let view = cart::load(&state).await;
    assert_eq!(backend.hits("GET", keys::CART), 2);
    assert_eq!(view.summary.item_count, 2);
    assert_eq!(view.items.items()[0].name, "Walnut Bowl");
}

#[tokio::test]
async fn test_quantity_over_stock_is_caught_before_sending() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    let apron = product_card::detail(&state, product_id(3)).await.unwrap();
    let result = product_card::add_to_cart(&state, &apron, 3).await;

    assert!(matches!(result, Err(ViewError::ValidationFailed(_))));
    assert_eq!(backend.hits("POST", keys::CART), 0);
}

#[tokio::test]
async fn test_backend_stock_rejection_is_shown_and_cart_kept() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;
    cart::load(&state).await;

    // A card rendered before the stock dropped.
    let mut product = product_card::detail(&state, product_id(3)).await.unwrap().product().clone();
    product.stock = 5;
    let stale = ProductCard::new(product);

    let result = product_card::add_to_cart(&state, &stale, 3).await;

    assert_eq!(
        result.unwrap_err(),
        ViewError::OperationFailed("Only 2 left in stock".to_string())
    );
    assert_eq!(backend.hits("POST", keys::CART), 1);
    // A failed write leaves the cache alone.
    cart::load(&state).await;
    assert_eq!(backend.hits("GET", keys::CART), 1);
}

#[tokio::test]
async fn test_zero_quantity_removes_line() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    let card = product_card::detail(&state, product_id(2)).await.unwrap();
    product_card::add_to_cart(&state, &card, 1).await.unwrap();
    let line = cart::load(&state).await.items.items()[0].clone();

    cart::update_quantity(&state, line.id, 0).await.unwrap();

    assert_eq!(backend.hits("DELETE", &keys::cart_item(line.id)), 1);
    assert_eq!(backend.hits("PATCH", &keys::cart_item(line.id)), 0);
    assert_eq!(cart::load(&state).await.items, ListState::Empty);
}

// ============================================================================
// Checkout and orders
// ============================================================================

#[tokio::test]
async fn test_checkout_of_empty_cart_sends_nothing() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    let view = cart::load(&state).await;
    let result = cart::checkout(&state, &view).await;

    assert!(matches!(result, Err(ViewError::ValidationFailed(_))));
    assert_eq!(backend.hits("POST", keys::ORDERS), 0);
}

#[tokio::test]
async fn test_checkout_invalidates_cart_and_orders() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    assert_eq!(orders::load(&state, &StatusFilter::All).await.items().len(), 3);
    let card = product_card::detail(&state, product_id(6)).await.unwrap();
    product_card::add_to_cart(&state, &card, 1).await.unwrap();
    let view = cart::load(&state).await;
    assert!(view.can_checkout());

    let order = cart::checkout(&state, &view).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, view.summary.subtotal);

    assert_eq!(cart::load(&state).await.items, ListState::Empty);
    let all = orders::load(&state, &StatusFilter::All).await;
    assert_eq!(all.items().len(), 4);
    assert_eq!(backend.hits("GET", keys::ORDERS), 2);
}

#[tokio::test]
async fn test_order_status_filter() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    let shipped = orders::load(&state, &"shipped".parse().unwrap()).await;
    let cancelled = orders::load(&state, &StatusFilter::Only(OrderStatus::Cancelled)).await;

    assert_eq!(shipped.items().len(), 1);
    assert_eq!(shipped.items()[0].id.as_i64(), 102);
    assert_eq!(cancelled, ListState::Empty);
    // Both filters read the same cached list.
    assert_eq!(backend.hits("GET", keys::ORDERS), 1);
}

// ============================================================================
// Modification requests
// ============================================================================

fn request_form(description: &str) -> RequestForm {
    RequestForm {
        description: description.to_string(),
        ..RequestForm::new(product_id(5), UserId::new(2).unwrap())
    }
}

#[tokio::test]
async fn test_short_description_is_never_sent() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    let result = modification_requests::submit(&state, &request_form("  bigger ")).await;

    assert!(matches!(result, Err(ViewError::ValidationFailed(_))));
    assert_eq!(backend.hits("POST", keys::MODIFICATION_REQUESTS), 0);
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_submit_then_seller_review() {
    let backend = MockBackend::start().await;
    let buyer = backend.signed_in(BUYER_EMAIL).await;
    let seller = backend.signed_in(SELLER_EMAIL).await;

    assert_eq!(modification_requests::buyer_requests(&buyer).await, ListState::Empty);

    modification_requests::submit(&buyer, &request_form("Could the vase come in matte blue?"))
        .await
        .unwrap();

    let mine = modification_requests::buyer_requests(&buyer).await;
    assert_eq!(backend.hits("GET", keys::BUYER_MODIFICATION_REQUESTS), 2);
    assert_eq!(mine.items()[0].status, RequestStatus::Pending);
    assert_eq!(mine.items()[0].product_name.as_deref(), Some("Porcelain Vase"));

    let inbox = modification_requests::seller_requests(&seller).await;
    let request = inbox.items()[0].clone();
    let form = ReviewForm {
        decision: ModificationDecision::Approved,
        response: "Yes, ready in two weeks.".to_string(),
    };
    let notice = modification_requests::review(&seller, &request, &form).await.unwrap();
    assert_eq!(notice.message, "Request approved.");

    let inbox = modification_requests::seller_requests(&seller).await;
    assert_eq!(backend.hits("GET", keys::SELLER_MODIFICATION_REQUESTS), 2);
    assert_eq!(inbox.items()[0].status, RequestStatus::Approved);
    assert_eq!(
        inbox.items()[0].seller_response.as_deref(),
        Some("Yes, ready in two weeks.")
    );

    // A decided request cannot be reviewed again.
    let again = modification_requests::review(&seller, &inbox.items()[0], &form).await;
    assert!(matches!(again, Err(ViewError::ValidationFailed(_))));
}

#[tokio::test]
async fn test_buyer_cannot_read_seller_inbox() {
    let backend = MockBackend::start().await;
    let buyer = backend.signed_in(BUYER_EMAIL).await;

    let inbox = modification_requests::seller_requests(&buyer).await;

    assert!(matches!(
        inbox,
        ListState::Failed {
            error: ViewError::OperationFailed(_),
            ..
        }
    ));
    // Forbidden is not a lost session.
    assert!(buyer.session().current().is_authenticated());
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn test_mark_read_refreshes_unread_count() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(BUYER_EMAIL).await;

    let before = notifications::load(&state).await;
    assert_eq!(notifications::unread_count(before.items()), 2);

    notifications::mark_read(&state, NotificationId::new(1).unwrap())
        .await
        .unwrap();

    let after = notifications::load(&state).await;
    assert_eq!(backend.hits("GET", keys::NOTIFICATIONS), 2);
    assert_eq!(notifications::unread_count(after.items()), 1);
    assert_eq!(
        notifications::badge_label(notifications::unread_count(after.items())).as_deref(),
        Some("1")
    );
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_user_listing_by_role() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(ADMIN_EMAIL).await;

    let sellers = admin::users(&state, admin::RoleFilter::Only(Role::Seller)).await;
    let everyone = admin::users(&state, admin::RoleFilter::All).await;

    assert_eq!(sellers.items().len(), 1);
    assert_eq!(sellers.items()[0].name, "Oren Pike");
    assert_eq!(
        admin::role_counts(everyone.items()),
        [(Role::Buyer, 1), (Role::Seller, 1), (Role::Admin, 1)]
    );
    assert_eq!(backend.hits("GET", keys::ADMIN_USERS), 1);
}

#[tokio::test]
async fn test_remove_listing_invalidates_product_lists() {
    let backend = MockBackend::start().await;
    let state = backend.signed_in(ADMIN_EMAIL).await;

    assert_eq!(product_card::catalog(&state, &ProductQuery::default()).await.items().len(), 6);

    admin::remove_listing(&state, product_id(4)).await.unwrap();

    let cards = product_card::catalog(&state, &ProductQuery::default()).await;
    assert_eq!(backend.hits("GET", keys::PRODUCTS), 2);
    assert_eq!(cards.items().len(), 5);
    assert!(cards.items().iter().all(|c| c.product().id != product_id(4)));
}
