//! Modification request submission (buyer) and review (seller).
//!
//! Both sides read lists that a write on either side changes, so every
//! write invalidates the buyer and the seller list.

use artisan_bazaar_core::{
    ModificationDecision, ModificationRequest, NewModificationRequest, ProductId, RequestStatus,
    ReviewModificationRequest, UserId,
};
use tracing::instrument;

use super::{ListState, StatusBadge, load_list, mutation};
use crate::api::keys;
use crate::error::{Notice, ViewError, add_breadcrumb};
use crate::state::AppState;

/// Shortest accepted description, in characters after trimming.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Longest accepted description or seller response, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Lists touched by any submission or review.
const AFFECTED: &[&str] = &[
    keys::BUYER_MODIFICATION_REQUESTS,
    keys::SELLER_MODIFICATION_REQUESTS,
];

/// The buyer's "request a modification" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestForm {
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub description: String,
}

impl RequestForm {
    #[must_use]
    pub const fn new(product_id: ProductId, seller_id: UserId) -> Self {
        Self {
            product_id,
            seller_id,
            description: String::new(),
        }
    }

    /// Check the form and build the request body.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::ValidationFailed` when the trimmed description
    /// is shorter than [`MIN_DESCRIPTION_CHARS`] or longer than
    /// [`MAX_DESCRIPTION_CHARS`].
    pub fn validate(&self) -> Result<NewModificationRequest, ViewError> {
        let description = self.description.trim();
        let len = description.chars().count();

        if len < MIN_DESCRIPTION_CHARS {
            return Err(ViewError::ValidationFailed(format!(
                "Please describe the modification in at least {MIN_DESCRIPTION_CHARS} characters."
            )));
        }
        if len > MAX_DESCRIPTION_CHARS {
            return Err(ViewError::ValidationFailed(format!(
                "Descriptions are limited to {MAX_DESCRIPTION_CHARS} characters."
            )));
        }

        Ok(NewModificationRequest {
            product_id: self.product_id,
            seller_id: self.seller_id,
            description: description.to_owned(),
        })
    }
}

/// The seller's approve/reject form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewForm {
    pub decision: ModificationDecision,
    pub response: String,
}

impl ReviewForm {
    /// Check the form against the request it answers.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::ValidationFailed` if the request was already
    /// reviewed or the response is too long.
    pub fn validate(&self, request: &ModificationRequest) -> Result<ReviewModificationRequest, ViewError> {
        if !request.status.is_open() {
            return Err(ViewError::ValidationFailed(
                "This request has already been reviewed.".to_string(),
            ));
        }

        let response = self.response.trim();
        if response.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(ViewError::ValidationFailed(format!(
                "Responses are limited to {MAX_DESCRIPTION_CHARS} characters."
            )));
        }

        Ok(ReviewModificationRequest {
            status: self.decision,
            seller_response: (!response.is_empty()).then(|| response.to_owned()),
        })
    }
}

/// Badge for a request status.
#[must_use]
pub fn badge(status: &RequestStatus) -> StatusBadge {
    StatusBadge::new(status.as_str(), status.treatment())
}

/// Requests the signed-in buyer submitted.
pub async fn buyer_requests(state: &AppState) -> ListState<ModificationRequest> {
    let api = state.api().clone();
    load_list(state, keys::BUYER_MODIFICATION_REQUESTS, move || async move {
        api.buyer_modification_requests().await
    })
    .await
}

/// Requests addressed to the signed-in seller.
pub async fn seller_requests(state: &AppState) -> ListState<ModificationRequest> {
    let api = state.api().clone();
    load_list(state, keys::SELLER_MODIFICATION_REQUESTS, move || async move {
        api.seller_modification_requests().await
    })
    .await
}

/// Submit a buyer's request.
///
/// # Errors
///
/// Returns `ViewError::ValidationFailed` without contacting the backend, or
/// the translated backend error.
#[instrument(skip(state, form), fields(product_id = %form.product_id))]
pub async fn submit(state: &AppState, form: &RequestForm) -> Result<Notice, ViewError> {
    let body = form.validate()?;
    let created = mutation(state, AFFECTED, state.api().submit_modification_request(&body)).await?;

    let request_id = created.id.to_string();
    add_breadcrumb(
        "modification_request",
        "Submitted request",
        Some(&[("request_id", request_id.as_str())]),
    );
    Ok(Notice::success("Your request was sent to the seller."))
}

/// Record a seller's decision on `request`.
///
/// # Errors
///
/// Returns `ViewError::ValidationFailed` without contacting the backend, or
/// the translated backend error.
#[instrument(skip(state, request, form), fields(request_id = %request.id))]
pub async fn review(
    state: &AppState,
    request: &ModificationRequest,
    form: &ReviewForm,
) -> Result<Notice, ViewError> {
    let body = form.validate(request)?;
    let _reviewed = mutation(
        state,
        AFFECTED,
        state.api().review_modification_request(request.id, &body),
    )
    .await?;

    Ok(Notice::success(match form.decision {
        ModificationDecision::Approved => "Request approved.",
        ModificationDecision::Rejected => "Request rejected.",
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use artisan_bazaar_core::{ModificationRequestId, StatusTreatment};
    use chrono::Utc;

    use super::*;
    use crate::config::ClientConfig;

    fn form(description: &str) -> RequestForm {
        RequestForm {
            description: description.to_string(),
            ..RequestForm::new(ProductId::new(4).unwrap(), UserId::new(2).unwrap())
        }
    }

    fn request(status: &str) -> ModificationRequest {
        ModificationRequest {
            id: ModificationRequestId::new(11).unwrap(),
            product_id: ProductId::new(4).unwrap(),
            product_name: Some("Linen Apron".to_string()),
            buyer_id: UserId::new(7).unwrap(),
            seller_id: UserId::new(2).unwrap(),
            description: "Add a second pocket please".to_string(),
            status: RequestStatus::parse(status),
            seller_response: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_description_length_is_measured_after_trimming() {
        assert!(form("   too short    ").validate().is_err());
        assert!(form("exactly10!").validate().is_ok());
        let body = form("  Add a pocket  ").validate().unwrap();
        assert_eq!(body.description, "Add a pocket");
    }

    #[test]
    fn test_description_upper_bound() {
        assert!(form(&"a".repeat(MAX_DESCRIPTION_CHARS)).validate().is_ok());
        assert!(form(&"a".repeat(MAX_DESCRIPTION_CHARS + 1)).validate().is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Nine characters, eighteen bytes.
        assert!(form("ééééééééé").validate().is_err());
    }

    #[tokio::test]
    async fn test_short_description_never_reaches_the_network() {
        let state = AppState::new(ClientConfig::new("http://127.0.0.1:9/").unwrap()).unwrap();
        let result = submit(&state, &form("bigger")).await;
        assert!(matches!(result, Err(ViewError::ValidationFailed(_))));
        assert!(!state.cache().is_fetching(keys::BUYER_MODIFICATION_REQUESTS));
    }

    #[test]
    fn test_review_form() {
        let approve = ReviewForm {
            decision: ModificationDecision::Approved,
            response: "  ".to_string(),
        };
        let body = approve.validate(&request("pending")).unwrap();
        assert_eq!(body.seller_response, None);

        assert!(approve.validate(&request("approved")).is_err());
        // Unknown statuses are not open for review.
        assert!(approve.validate(&request("escalated")).is_err());
    }

    #[test]
    fn test_request_badges() {
        assert_eq!(badge(&RequestStatus::Approved).treatment, StatusTreatment::Success);
        assert_eq!(badge(&RequestStatus::parse("escalated")).treatment, StatusTreatment::Neutral);
    }
}
