//! ArtisanBazaar client core.
//!
//! The layer between a marketplace UI and the REST backend.
//!
//! # Architecture
//!
//! - [`api`]: typed REST client over a cookie session
//! - [`cache`]: query cache keyed by resource path, with request coalescing
//!   and stale-response suppression
//! - [`session`]: the signed-in identity and its lifecycle
//! - [`guard`]: pure route authorization and the role navigation table
//! - [`views`]: view-models for products, cart, orders, modification
//!   requests, notifications, and admin moderation
//! - [`AppState`]: one cloneable handle bundling all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use artisan_bazaar_client::{AppState, ClientConfig, guard};
//!
//! let state = AppState::new(ClientConfig::from_env()?)?;
//! state.session().init().await;
//!
//! match guard::guard("/dashboard/buyer/orders", &state.session().current()) {
//!     guard::GuardDecision::Allow => { /* render */ }
//!     guard::GuardDecision::Pending => { /* spinner */ }
//!     guard::GuardDecision::Redirect(to) => { /* navigate */ }
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod state;
pub mod views;

pub use api::ApiClient;
pub use cache::{QueryCache, QueryOptions};
pub use config::{CacheConfig, ClientConfig, ConfigError};
pub use error::{ApiError, Notice, NoticeLevel, ViewError};
pub use session::{SessionManager, SessionState};
pub use state::AppState;
