//! Server entity projections.
//!
//! The backend owns every record here; the client only holds read-only,
//! possibly stale copies fetched through the query cache. Field names follow
//! the backend's camelCase JSON.

pub mod cart;
pub mod modification;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{AddToCart, CartItem, CartSummary, UpdateCartItem};
pub use modification::{ModificationDecision, ModificationRequest, NewModificationRequest, ReviewModificationRequest};
pub use notification::Notification;
pub use order::{Order, OrderLine};
pub use product::Product;
pub use user::{Credentials, User};
