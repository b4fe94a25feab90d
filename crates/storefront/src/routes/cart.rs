//! Cart route handlers.
//!
//! Input is form-encoded, output is JSON. Mutations send an `HX-Trigger:
//! cart-updated` header so HTMX pages can refresh their cart badge.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sessioncart_core::{CartItemId, Price};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CartSession;
use crate::services::cart::CartUpdate;
use crate::state::AppState;

/// Header used to notify HTMX listeners.
const HX_TRIGGER: &str = "HX-Trigger";

/// Event fired after any cart mutation.
const CART_UPDATED: &str = "cart-updated";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_slug: String,
    pub quantity: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Cart subtotal.
#[derive(Debug, Serialize)]
pub struct SubtotalResponse {
    pub subtotal: Price,
}

/// Display the cart.
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, mut cart: CartSession) -> Result<Response> {
    let summary = state.cart().cart_summary(cart.context()).await?;
    cart.commit().await?;

    Ok(Json(summary).into_response())
}

/// Number of distinct items in the cart.
#[instrument(skip(state, cart))]
pub async fn count(State(state): State<AppState>, mut cart: CartSession) -> Result<Response> {
    let count = state.cart().count_items(cart.context()).await?;
    cart.commit().await?;

    Ok(Json(CountResponse { count }).into_response())
}

/// Cart subtotal.
#[instrument(skip(state, cart))]
pub async fn subtotal(State(state): State<AppState>, mut cart: CartSession) -> Result<Response> {
    let subtotal = state.cart().cart_subtotal(cart.context()).await?;
    cart.commit().await?;

    Ok(Json(SubtotalResponse {
        subtotal: Price::new(subtotal),
    })
    .into_response())
}

/// Add an item to the cart.
///
/// Returns the resulting line, which may be an existing line with a larger
/// quantity.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: CartSession,
    form: std::result::Result<Form<AddToCartForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let item = state
        .cart()
        .add_to_cart(
            cart.context_for_write().await?,
            &form.product_slug,
            form.quantity.as_deref(),
        )
        .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product", form.product_slug.as_str())]),
    );
    tracing::info!(item_id = %item.id, quantity = %item.quantity, "item added to cart");

    Ok((AppendHeaders([(HX_TRIGGER, CART_UPDATED)]), Json(item)).into_response())
}

/// Update an item's quantity. Zero or less removes it.
#[instrument(skip(state, cart))]
pub async fn update(
    State(state): State<AppState>,
    mut cart: CartSession,
    form: std::result::Result<Form<UpdateCartForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let update = state
        .cart()
        .update_cart(cart.context_for_write().await?, form.item_id, &form.quantity)
        .await?;

    match &update {
        CartUpdate::Updated(item) => {
            tracing::info!(item_id = %item.id, quantity = %item.quantity, "cart item updated");
        }
        CartUpdate::Removed(item_id) => {
            tracing::info!(%item_id, "cart item removed by update");
        }
    }

    summary_response(&state, &mut cart).await
}

/// Remove an item from the cart.
#[instrument(skip(state, cart))]
pub async fn remove(
    State(state): State<AppState>,
    mut cart: CartSession,
    form: std::result::Result<Form<RemoveFromCartForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let item = state
        .cart()
        .remove_from_cart(cart.context_for_write().await?, form.item_id)
        .await?;
    tracing::info!(item_id = %item.id, "cart item removed");

    summary_response(&state, &mut cart).await
}

/// Remove every item from the cart.
#[instrument(skip(state, cart))]
pub async fn clear(State(state): State<AppState>, mut cart: CartSession) -> Result<Response> {
    let removed = state
        .cart()
        .empty_cart(cart.context_for_write().await?)
        .await?;
    tracing::info!(removed, "cart cleared");

    summary_response(&state, &mut cart).await
}

/// Respond to a mutation with the refreshed cart.
async fn summary_response(state: &AppState, cart: &mut CartSession) -> Result<Response> {
    let summary = state.cart().cart_summary(cart.context()).await?;
    cart.commit().await?;

    Ok((AppendHeaders([(HX_TRIGGER, CART_UPDATED)]), Json(summary)).into_response())
}
