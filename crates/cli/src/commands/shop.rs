//! Catalog, cart, and order commands.

use artisan_bazaar_client::AppState;
use artisan_bazaar_client::api::ProductQuery;
use artisan_bazaar_client::views::product_card::{self, ProductCard, StockState};
use artisan_bazaar_client::views::{cart, orders};
use artisan_bazaar_core::{CartItemId, ProductId};

use super::{CommandError, print_list, report};

fn card_line(card: &ProductCard) -> String {
    let product = card.product();
    let stock = match card.stock() {
        StockState::InStock => "in stock".to_string(),
        StockState::LowStock(n) => format!("only {n} left"),
        StockState::OutOfStock => "sold out".to_string(),
    };
    let featured = if card.is_featured() { " *" } else { "" };
    format!(
        "#{:<5} {:<32} {:>10}  {}  {}{featured}",
        product.id,
        product.name,
        card.price_label(),
        card.seller_label().unwrap_or_default(),
        stock,
    )
}

pub async fn featured(state: &AppState) {
    print_list("featured products", &product_card::featured(state).await, card_line);
}

pub async fn catalog(state: &AppState, category: Option<String>, search: Option<String>) {
    let query = ProductQuery { category, search };
    print_list("products", &product_card::catalog(state, &query).await, card_line);
}

pub async fn product(state: &AppState, id: ProductId) -> Result<(), CommandError> {
    let card = product_card::detail(state, id).await?;
    tracing::info!("{}", card_line(&card));
    if !card.product().description.is_empty() {
        tracing::info!("{}", card.product().description);
    }
    Ok(())
}

pub async fn show_cart(state: &AppState) {
    let view = cart::load(state).await;
    print_list("items in your cart", &view.items, |item| {
        format!(
            "#{:<5} {:<32} {:>3} x {:>10} = {:>10}",
            item.id,
            item.name,
            item.quantity,
            item.price,
            item.line_total()
        )
    });
    tracing::info!(
        "{} item(s), subtotal {}",
        view.summary.item_count,
        view.summary.subtotal
    );
}

pub async fn add_to_cart(state: &AppState, id: ProductId, quantity: u32) -> Result<(), CommandError> {
    let card = product_card::detail(state, id).await?;
    report(&product_card::add_to_cart(state, &card, quantity).await?);
    Ok(())
}

pub async fn update_cart(state: &AppState, id: CartItemId, quantity: u32) -> Result<(), CommandError> {
    report(&cart::update_quantity(state, id, quantity).await?);
    Ok(())
}

pub async fn checkout(state: &AppState) -> Result<(), CommandError> {
    let view = cart::load(state).await;
    let order = cart::checkout(state, &view).await?;
    tracing::info!("Order #{} placed, total {}", order.id, order.total);
    Ok(())
}

pub async fn orders(state: &AppState, status: &str) {
    let filter: orders::StatusFilter = match status.parse() {
        Ok(filter) => filter,
        Err(never) => match never {},
    };
    let list = orders::load(state, &filter).await;
    print_list(&format!("{filter} orders"), &list, |order| {
        let badge = orders::badge(&order.status);
        format!(
            "#{:<5} {:<12} {:>10}  {}",
            order.id,
            badge.label,
            order.total,
            order.created_at.format("%Y-%m-%d")
        )
    });
}
