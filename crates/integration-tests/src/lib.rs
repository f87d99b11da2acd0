//! Integration tests for the ArtisanBazaar client core.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p artisan-bazaar-integration-tests
//! ```
//!
//! Each test starts an in-process [`MockBackend`] on a random local port.
//! The mock speaks the marketplace REST surface with cookie sessions, keeps
//! its data in memory, and counts every request by method and path so tests
//! can assert exactly which requests the client sent.
//!
//! # Test Categories
//!
//! - `session` - identity resolution, sign-in, logout, expired sessions
//! - `data_flows` - cache coalescing and invalidation through the views
//! - `routing` - guard decisions following real session changes

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use artisan_bazaar_client::{AppState, ClientConfig};
use artisan_bazaar_core::{
    CartItem, CartItemId, Email, ModificationRequest, ModificationRequestId, Notification,
    NotificationId, Order, OrderId, OrderLine, OrderStatus, Price, Product, ProductId,
    RequestStatus, Role, User, UserId,
};
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;

/// Password accepted for every fixture account.
pub const PASSWORD: &str = "correct-horse";

pub const ADMIN_EMAIL: &str = "ada@bazaar.example";
pub const SELLER_EMAIL: &str = "oren@bazaar.example";
pub const BUYER_EMAIL: &str = "ines@bazaar.example";

/// Session cookie name.
const SESSION_COOKIE: &str = "bazaar_session";

type Shared = Arc<MockState>;

/// In-process marketplace backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
}

struct MockState {
    hits: Mutex<HashMap<String, usize>>,
    users: Vec<User>,
    products: Mutex<Vec<Product>>,
    cart: Mutex<Vec<(UserId, CartItem)>>,
    orders: Mutex<Vec<(UserId, Order)>>,
    requests: Mutex<Vec<ModificationRequest>>,
    notifications: Mutex<Vec<(UserId, Notification)>>,
    next_id: AtomicI64,
    me_delay: Mutex<Duration>,
    fail_logout: AtomicBool,
    sessions_expired: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockState {
    fn seeded() -> Self {
        let user = |id: i64, name: &str, email: &str, role: Role| User {
            id: UserId::new(id).unwrap(),
            name: name.to_string(),
            email: Email::parse(email).unwrap(),
            role,
            profile_image: None,
        };
        let users = vec![
            user(1, "Ada Admin", ADMIN_EMAIL, Role::Admin),
            user(2, "Oren Pike", SELLER_EMAIL, Role::Seller),
            user(7, "Ines Ward", BUYER_EMAIL, Role::Buyer),
        ];

        let product = |id: i64, name: &str, cents: i64, stock: u32, category: &str| Product {
            id: ProductId::new(id).unwrap(),
            name: name.to_string(),
            description: format!("Handmade {}", name.to_lowercase()),
            price: Price::from_cents(cents),
            category: Some(category.to_string()),
            images: vec![format!("https://cdn.bazaar.example/{id}.jpg")],
            stock,
            seller_id: UserId::new(2).unwrap(),
            seller_name: Some("Oren Pike".to_string()),
            rating: Some(4.5),
        };
        let products = vec![
            product(1, "Walnut Bowl", 4200, 10, "woodwork"),
            product(2, "Stoneware Mug", 1800, 25, "ceramics"),
            product(3, "Linen Apron", 3600, 2, "textiles"),
            product(4, "Oak Cutting Board", 5500, 0, "woodwork"),
            product(5, "Porcelain Vase", 7200, 4, "ceramics"),
            product(6, "Wool Throw", 9800, 8, "textiles"),
        ];

        let buyer = UserId::new(7).unwrap();
        let order = |id: i64, status: &str, cents: i64| {
            (
                buyer,
                Order {
                    id: OrderId::new(id).unwrap(),
                    status: OrderStatus::parse(status),
                    total: Price::from_cents(cents),
                    created_at: Utc::now(),
                    items: vec![OrderLine {
                        product_id: ProductId::new(2).unwrap(),
                        product_name: "Stoneware Mug".to_string(),
                        quantity: 1,
                        price: Price::from_cents(cents),
                    }],
                },
            )
        };
        let orders = vec![
            order(101, "pending", 1800),
            order(102, "shipped", 3600),
            order(103, "delivered", 4200),
        ];

        let notification = |id: i64, owner: i64, message: &str| {
            (
                UserId::new(owner).unwrap(),
                Notification {
                    id: NotificationId::new(id).unwrap(),
                    message: message.to_string(),
                    read: false,
                    link: Some("/dashboard".to_string()),
                    created_at: Utc::now(),
                },
            )
        };
        let notifications = vec![
            notification(1, 7, "Your order #102 has shipped"),
            notification(2, 7, "Oren Pike replied to your request"),
            notification(3, 2, "New modification request"),
        ];

        Self {
            hits: Mutex::new(HashMap::new()),
            users,
            products: Mutex::new(products),
            cart: Mutex::new(Vec::new()),
            orders: Mutex::new(orders),
            requests: Mutex::new(Vec::new()),
            notifications: Mutex::new(notifications),
            next_id: AtomicI64::new(500),
            me_delay: Mutex::new(Duration::ZERO),
            fail_logout: AtomicBool::new(false),
            sessions_expired: AtomicBool::new(false),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// The user behind the request's session cookie.
    fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        if self.sessions_expired.load(Ordering::SeqCst) {
            return None;
        }
        let id = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .find_map(|pair| pair.trim().strip_prefix(&format!("{SESSION_COOKIE}=")).map(str::to_owned))?
            .parse::<i64>()
            .ok()?;
        self.users.iter().find(|user| user.id.as_i64() == id).cloned()
    }

    fn require(&self, headers: &HeaderMap) -> Result<User, Response> {
        self.current_user(headers)
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Not authenticated"))
    }

    fn require_role(&self, headers: &HeaderMap, role: Role) -> Result<User, Response> {
        let user = self.require(headers)?;
        if user.role == role {
            Ok(user)
        } else {
            Err(error(StatusCode::FORBIDDEN, "Forbidden"))
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

impl MockBackend {
    /// Start a backend with the fixture data on a random local port.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(MockState::seeded());
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL of the backend.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// A fresh client (own cookie jar, cache, and session) for this backend.
    #[must_use]
    pub fn client(&self) -> AppState {
        AppState::new(ClientConfig::new(&self.url()).unwrap()).unwrap()
    }

    /// A client signed in as `email`.
    pub async fn signed_in(&self, email: &str) -> AppState {
        let state = self.client();
        state
            .session()
            .sign_in(email, &SecretString::from(PASSWORD))
            .await
            .unwrap();
        state
    }

    /// How many `method path` requests the backend has served.
    #[must_use]
    pub fn hits(&self, method: &str, path: &str) -> usize {
        lock(&self.state.hits)
            .get(&format!("{method} {path}"))
            .copied()
            .unwrap_or(0)
    }

    /// Delay every `GET /api/auth/me` response.
    pub fn delay_me(&self, delay: Duration) {
        *lock(&self.state.me_delay) = delay;
    }

    /// Make `POST /api/auth/logout` answer 500.
    pub fn fail_logout(&self, fail: bool) {
        self.state.fail_logout.store(fail, Ordering::SeqCst);
    }

    /// Treat every session cookie as expired.
    pub fn expire_sessions(&self) {
        self.state.sessions_expired.store(true, Ordering::SeqCst);
    }

    /// Number of modification requests stored.
    #[must_use]
    pub fn request_count(&self) -> usize {
        lock(&self.state.requests).len()
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/products", get(products))
        .route("/api/products/featured", get(featured))
        .route("/api/products/{id}", get(product))
        .route("/api/cart", get(cart).post(add_to_cart))
        .route("/api/cart/{id}", patch(update_cart_item).delete(remove_cart_item))
        .route("/api/orders", get(orders).post(checkout))
        .route("/api/product-modification-requests", post(submit_request))
        .route("/api/product-modification-requests/buyer", get(buyer_requests))
        .route("/api/product-modification-requests/seller", get(seller_requests))
        .route("/api/product-modification-requests/{id}", patch(review_request))
        .route("/api/notifications", get(notifications))
        .route("/api/notifications/{id}/read", patch(mark_read))
        .route("/api/admin/users", get(admin_users))
        .route("/api/admin/products/{id}", delete(remove_listing))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), count_hits))
        .with_state(state)
}

async fn count_hits(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let key = format!("{} {}", request.method(), request.uri().path());
    *lock(&state.hits).entry(key).or_default() += 1;
    next.run(request).await
}

// ============================================================================
// Auth
// ============================================================================

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let delay = *lock(&state.me_delay);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    match state.require(&headers) {
        Ok(user) => Json(user).into_response(),
        Err(response) => response,
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let user = state
        .users
        .iter()
        .find(|user| user.email.as_str() == body.email && body.password == PASSWORD);

    match user {
        Some(user) => (
            [(
                header::SET_COOKIE,
                format!("{SESSION_COOKIE}={}; Path=/; HttpOnly", user.id),
            )],
            Json(user.clone()),
        )
            .into_response(),
        None => error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn logout(State(state): State<Shared>) -> Response {
    if state.fail_logout.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Session store unavailable");
    }
    (
        [(
            header::SET_COOKIE,
            format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"),
        )],
        StatusCode::NO_CONTENT,
    )
        .into_response()
}

// ============================================================================
// Products
// ============================================================================

#[derive(Deserialize)]
struct ProductFilter {
    category: Option<String>,
    search: Option<String>,
}

async fn products(
    State(state): State<Shared>,
    axum::extract::Query(filter): axum::extract::Query<ProductFilter>,
) -> Response {
    let list: Vec<Product> = lock(&state.products)
        .iter()
        .filter(|p| {
            filter
                .category
                .as_ref()
                .is_none_or(|c| p.category.as_ref() == Some(c))
        })
        .filter(|p| {
            filter
                .search
                .as_ref()
                .is_none_or(|s| p.name.to_lowercase().contains(&s.to_lowercase()))
        })
        .cloned()
        .collect();
    Json(list).into_response()
}

async fn featured(State(state): State<Shared>) -> Response {
    let list: Vec<Product> = lock(&state.products)
        .iter()
        .filter(|p| p.in_stock())
        .take(3)
        .cloned()
        .collect();
    Json(list).into_response()
}

async fn product(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    lock(&state.products)
        .iter()
        .find(|p| p.id.as_i64() == id)
        .cloned()
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p).into_response(),
        )
}

// ============================================================================
// Cart and orders
// ============================================================================

async fn cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let items: Vec<CartItem> = lock(&state.cart)
        .iter()
        .filter(|(owner, _)| *owner == user.id)
        .map(|(_, item)| item.clone())
        .collect();
    Json(items).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    product_id: i64,
    quantity: u32,
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(product) = lock(&state.products)
        .iter()
        .find(|p| p.id.as_i64() == body.product_id)
        .cloned()
    else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    if body.quantity == 0 || body.quantity > product.stock {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("Only {} left in stock", product.stock),
        );
    }

    let item = CartItem {
        id: CartItemId::new(state.next_id()).unwrap(),
        product_id: product.id,
        name: product.name.clone(),
        price: product.price,
        quantity: body.quantity,
        image_url: product.thumbnail().map(str::to_owned),
    };
    lock(&state.cart).push((user.id, item.clone()));
    (StatusCode::CREATED, Json(item)).into_response()
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: u32,
}

async fn update_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<QuantityBody>,
) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let mut cart = lock(&state.cart);
    match cart
        .iter_mut()
        .find(|(owner, item)| *owner == user.id && item.id.as_i64() == id)
    {
        Some((_, item)) => {
            item.quantity = body.quantity;
            Json(item.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Cart item not found"),
    }
}

async fn remove_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    lock(&state.cart).retain(|(owner, item)| !(*owner == user.id && item.id.as_i64() == id));
    StatusCode::NO_CONTENT.into_response()
}

async fn orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let list: Vec<Order> = lock(&state.orders)
        .iter()
        .filter(|(owner, _)| *owner == user.id)
        .map(|(_, order)| order.clone())
        .collect();
    Json(list).into_response()
}

async fn checkout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let lines: Vec<CartItem> = {
        let mut cart = lock(&state.cart);
        let (mine, rest): (Vec<_>, Vec<_>) = cart.drain(..).partition(|(owner, _)| *owner == user.id);
        *cart = rest;
        mine.into_iter().map(|(_, item)| item).collect()
    };
    if lines.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let order = Order {
        id: OrderId::new(state.next_id()).unwrap(),
        status: OrderStatus::Pending,
        total: lines.iter().map(CartItem::line_total).sum(),
        created_at: Utc::now(),
        items: lines
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                product_name: item.name.clone(),
                quantity: item.quantity,
                price: item.price,
            })
            .collect(),
    };
    lock(&state.orders).push((user.id, order.clone()));
    (StatusCode::CREATED, Json(order)).into_response()
}

// ============================================================================
// Modification requests
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewRequestBody {
    product_id: i64,
    seller_id: i64,
    description: String,
}

async fn submit_request(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewRequestBody>,
) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if body.description.trim().chars().count() < 10 {
        return error(StatusCode::BAD_REQUEST, "Description is too short");
    }
    let product_name = lock(&state.products)
        .iter()
        .find(|p| p.id.as_i64() == body.product_id)
        .map(|p| p.name.clone());

    let request = ModificationRequest {
        id: ModificationRequestId::new(state.next_id()).unwrap(),
        product_id: ProductId::new(body.product_id).unwrap(),
        product_name,
        buyer_id: user.id,
        seller_id: UserId::new(body.seller_id).unwrap(),
        description: body.description,
        status: RequestStatus::Pending,
        seller_response: None,
        created_at: Utc::now(),
    };
    lock(&state.requests).push(request.clone());
    (StatusCode::CREATED, Json(request)).into_response()
}

async fn buyer_requests(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let list: Vec<ModificationRequest> = lock(&state.requests)
        .iter()
        .filter(|r| r.buyer_id == user.id)
        .cloned()
        .collect();
    Json(list).into_response()
}

async fn seller_requests(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let user = match state.require_role(&headers, Role::Seller) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let list: Vec<ModificationRequest> = lock(&state.requests)
        .iter()
        .filter(|r| r.seller_id == user.id)
        .cloned()
        .collect();
    Json(list).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewBody {
    status: String,
    seller_response: Option<String>,
}

async fn review_request(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<ReviewBody>,
) -> Response {
    let user = match state.require_role(&headers, Role::Seller) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let mut requests = lock(&state.requests);
    match requests
        .iter_mut()
        .find(|r| r.id.as_i64() == id && r.seller_id == user.id)
    {
        Some(request) => {
            request.status = RequestStatus::parse(&body.status);
            request.seller_response = body.seller_response;
            Json(request.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Request not found"),
    }
}

// ============================================================================
// Notifications and admin
// ============================================================================

async fn notifications(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let list: Vec<Notification> = lock(&state.notifications)
        .iter()
        .filter(|(owner, _)| *owner == user.id)
        .map(|(_, n)| n.clone())
        .collect();
    Json(list).into_response()
}

async fn mark_read(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let user = match state.require(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    for (owner, notification) in lock(&state.notifications).iter_mut() {
        if *owner == user.id && notification.id.as_i64() == id {
            notification.read = true;
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn admin_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = state.require_role(&headers, Role::Admin) {
        return response;
    }
    Json(state.users.clone()).into_response()
}

async fn remove_listing(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = state.require_role(&headers, Role::Admin) {
        return response;
    }
    lock(&state.products).retain(|p| p.id.as_i64() != id);
    StatusCode::NO_CONTENT.into_response()
}
