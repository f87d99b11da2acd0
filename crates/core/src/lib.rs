//! ArtisanBazaar Core - Shared types library.
//!
//! This crate provides the types shared by every ArtisanBazaar component:
//! - `client` - API client, query cache, session manager, route guard, views
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Entity
//! models are read-only projections of server-owned records.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, roles, and statuses
//! - [`models`] - Server entity projections (users, products, orders, ...)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
