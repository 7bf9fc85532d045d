//! Shopping cart route handlers.
//!
//! Every handler works on the logged-in user's own cart.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bookstore_core::{BookId, CartId, CartItemId, Price, Quantity, UserId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{CartItem, ShoppingCart};
use crate::services::cart::CartError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub book_id: BookId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub id: CartItemId,
    pub book_id: BookId,
    pub book_title: String,
    pub quantity: Quantity,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            book_id: item.book_id,
            book_title: item.book_title,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: CartId,
    pub user_id: UserId,
    pub cart_items: Vec<CartItemResponse>,
    /// Sum of the lines at current book prices.
    pub subtotal: Price,
}

impl From<ShoppingCart> for CartResponse {
    fn from(cart: ShoppingCart) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id,
            subtotal: cart.subtotal(),
            cart_items: cart.items.into_iter().map(Into::into).collect(),
        }
    }
}

fn quantity(value: i64) -> Result<Quantity> {
    Ok(Quantity::from_i64(value).map_err(CartError::from)?)
}

/// Show the user's cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    let cart = state.cart().cart(user.id).await?;
    Ok(Json(cart.into()))
}

/// Add a line to the user's cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<AddCartItemRequest>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .cart()
        .add_item(user.id, request.book_id, quantity(request.quantity)?)
        .await?;
    Ok(Json(cart.into()))
}

/// Change the quantity of a line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<CartItemResponse>> {
    let item = state
        .cart()
        .update_item(user.id, id, quantity(request.quantity)?)
        .await?;
    Ok(Json(item.into()))
}

/// Remove a line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    state.cart().remove_item(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_cart_response_carries_subtotal() {
        let cart = ShoppingCart {
            id: CartId::new(7),
            user_id: UserId::new(1),
            items: vec![CartItem {
                id: CartItemId::new(2),
                book_id: BookId::new(5),
                book_title: "Dune".to_owned(),
                book_price: Price::new(Decimal::new(1000, 2)),
                quantity: Quantity::new(3).unwrap(),
            }],
        };

        let json = serde_json::to_value(CartResponse::from(cart)).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["cartItems"][0]["bookTitle"], "Dune");
        assert_eq!(json["subtotal"], "30.00");
    }
}
