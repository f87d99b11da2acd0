//! Product modification requests.
//!
//! A buyer asks a seller to customize a listed product before purchase; the
//! seller approves or rejects it with an optional response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ModificationRequestId, ProductId, RequestStatus, UserId};

/// A modification request as listed for either party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationRequest {
    pub id: ModificationRequestId,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    /// What the buyer wants changed.
    pub description: String,
    pub status: RequestStatus,
    #[serde(default)]
    pub seller_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body for `POST /api/product-modification-requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModificationRequest {
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub description: String,
}

/// Seller decision on an open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationDecision {
    Approved,
    Rejected,
}

/// Body for `PATCH /api/product-modification-requests/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewModificationRequest {
    pub status: ModificationDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_response: Option<String>,
}
