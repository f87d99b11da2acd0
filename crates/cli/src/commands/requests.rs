//! Modification request commands.

use artisan_bazaar_client::views::ListState;
use artisan_bazaar_client::views::modification_requests::{
    self, RequestForm, ReviewForm, buyer_requests, seller_requests,
};
use artisan_bazaar_client::{AppState, ViewError};
use artisan_bazaar_core::{
    ModificationDecision, ModificationRequest, ModificationRequestId, ProductId, UserId,
};

use super::{CommandError, print_list, report};

fn request_line(request: &ModificationRequest) -> String {
    let badge = modification_requests::badge(&request.status);
    let product = request
        .product_name
        .clone()
        .unwrap_or_else(|| format!("product #{}", request.product_id));
    let response = request
        .seller_response
        .as_deref()
        .map(|r| format!(" / seller: {r}"))
        .unwrap_or_default();
    format!(
        "#{:<5} {:<10} {product}: {}{response}",
        request.id, badge.label, request.description
    )
}

pub async fn list_buyer(state: &AppState) {
    print_list("requests", &buyer_requests(state).await, request_line);
}

pub async fn list_seller(state: &AppState) {
    print_list("requests", &seller_requests(state).await, request_line);
}

pub async fn submit(
    state: &AppState,
    product_id: ProductId,
    seller_id: UserId,
    description: String,
) -> Result<(), CommandError> {
    let form = RequestForm {
        description,
        ..RequestForm::new(product_id, seller_id)
    };
    report(&modification_requests::submit(state, &form).await?);
    Ok(())
}

pub async fn review(
    state: &AppState,
    id: ModificationRequestId,
    approve: bool,
    response: String,
) -> Result<(), CommandError> {
    let requests = seller_requests(state).await;
    let request = match &requests {
        ListState::Ready(items) => items.iter().find(|r| r.id == id),
        _ => None,
    }
    .ok_or_else(|| ViewError::ValidationFailed(format!("No request #{id} is addressed to you.")))?;

    let form = ReviewForm {
        decision: if approve {
            ModificationDecision::Approved
        } else {
            ModificationDecision::Rejected
        },
        response,
    };
    report(&modification_requests::review(state, request, &form).await?);
    Ok(())
}
