//! Cart and checkout endpoints. All require a session.
//!
//! Every mutating endpoint answers with `success`, `message`,
//! `total_items` and `total_price` (cents) so clients can refresh their
//! cart badge without a second request.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use cart::{
    AddOutcome, CartError, CartItemId, CartTotals, CartView, Mutation, ProductId,
    QuantityOutcome, quantity::parse_quantity,
};
use catalog::Money;
use checkout::{CONFIRMATION, Receipt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_product_id;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    /// Number or numeric string; anything else counts as 1.
    #[serde(default)]
    pub quantity: Option<Value>,
}

#[derive(Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: Option<Value>,
}

#[derive(Serialize)]
pub struct MutationResponse<O> {
    pub success: bool,
    pub message: String,
    pub total_items: u64,
    pub total_price: Money,
    pub outcome: O,
}

impl<O> MutationResponse<O> {
    fn new(mutation: Mutation<O>, success: bool) -> Self {
        Self {
            success,
            message: mutation.notice,
            total_items: mutation.totals.total_items,
            total_price: mutation.totals.total_price,
            outcome: mutation.outcome,
        }
    }
}

#[derive(Serialize)]
pub struct StatusItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub total_items: u64,
    pub total_price: Money,
    pub items: Vec<StatusItem>,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: &'static str,
    pub total_items: u64,
    pub total_price: Money,
    pub receipt: Receipt,
}

/// Reads a quantity from a JSON number or numeric string.
fn quantity_from(value: Option<&Value>) -> Result<i64, CartError> {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| CartError::InvalidQuantity(n.to_string())),
        Some(Value::String(s)) => parse_quantity(s),
        Some(other) => Err(CartError::InvalidQuantity(other.to_string())),
        None => Err(CartError::InvalidQuantity(String::new())),
    }
}

fn parse_item_id(raw: &str) -> Result<CartItemId, ApiError> {
    CartItemId::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid item id: {e}")))
}

/// GET /cart
pub async fn view(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(state.carts.view(user.account.id).await?))
}

/// GET /cart/status
pub async fn status(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.carts.status(user.account.id).await?;
    Ok(Json(StatusResponse {
        total_items: status.totals.total_items,
        total_price: status.totals.total_price,
        items: status
            .items
            .into_iter()
            .map(|(product_id, quantity)| StatusItem {
                product_id,
                quantity,
            })
            .collect(),
    }))
}

/// POST /cart/items
#[tracing::instrument(skip_all, fields(user_id = %user.account.id, product_id = %req.product_id))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<MutationResponse<AddOutcome>>, ApiError> {
    let product_id = parse_product_id(&req.product_id)?;
    let requested = match req.quantity.as_ref() {
        None => 1,
        Some(value) => quantity_from(Some(value)).unwrap_or_else(|_| {
            tracing::debug!(%value, "non-numeric quantity treated as 1");
            1
        }),
    };

    let mutation = state
        .carts
        .add_item(user.account.id, product_id, requested)
        .await?;
    let success = mutation.outcome.is_success();
    Ok(Json(MutationResponse::new(mutation, success)))
}

/// PATCH /cart/items/{item_id}
#[tracing::instrument(skip(state, user, req), fields(user_id = %user.account.id))]
pub async fn set_quantity(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(item_id): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<MutationResponse<QuantityOutcome>>, ApiError> {
    let item_id = parse_item_id(&item_id)?;
    let requested = quantity_from(req.quantity.as_ref())?;

    let mutation = state
        .carts
        .set_item_quantity(user.account.id, item_id, requested)
        .await?;
    Ok(Json(MutationResponse::new(mutation, true)))
}

/// DELETE /cart/items/{item_id}
#[tracing::instrument(skip(state, user), fields(user_id = %user.account.id))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(item_id): Path<String>,
) -> Result<Json<MutationResponse<()>>, ApiError> {
    let item_id = parse_item_id(&item_id)?;
    let mutation = state.carts.remove_item(user.account.id, item_id).await?;
    Ok(Json(MutationResponse::new(mutation, true)))
}

/// DELETE /cart
pub async fn clear(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<MutationResponse<usize>>, ApiError> {
    let mutation = state.carts.clear(user.account.id).await?;
    Ok(Json(MutationResponse::new(mutation, true)))
}

/// POST /cart/checkout
#[tracing::instrument(skip_all, fields(user_id = %user.account.id))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let receipt = state.checkout.checkout(user.account.id).await?;
    let totals: CartTotals = state.carts.status(user.account.id).await?.totals;
    Ok(Json(CheckoutResponse {
        success: true,
        message: CONFIRMATION,
        total_items: totals.total_items,
        total_price: totals.total_price,
        receipt,
    }))
}
