//! Order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bookstore_core::{BookId, OrderId, OrderItemId, OrderStatus, Price, Quantity, UserId};

use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Order, OrderItem};
use crate::routes::PageQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub shipping_address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: OrderItemId,
    pub book_id: BookId,
    pub quantity: Quantity,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            book_id: item.book_id,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_items: Vec<OrderItemResponse>,
    pub order_date: DateTime<Utc>,
    pub total: Price,
    pub status: OrderStatus,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            order_items: order.items.into_iter().map(Into::into).collect(),
            order_date: order.order_date,
            total: order.total,
            status: order.status,
        }
    }
}

/// Place an order from the user's cart.
#[instrument(skip(state, user, request), fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<OrderResponse>> {
    let order = state
        .orders()
        .place_order(&user, &request.shipping_address)
        .await?;
    Ok(Json(order.into()))
}

/// The user's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = state.orders().history(&user, page.into()).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Items of one order.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn items(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<OrderItemResponse>>> {
    let items = state.orders().order_items(&user, id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// One item of an order.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((id, item_id)): Path<(OrderId, OrderItemId)>,
) -> Result<Json<OrderItemResponse>> {
    let item = state.orders().order_item(&user, id, item_id).await?;
    Ok(Json(item.into()))
}

/// Move an order to its next status.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn advance_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let order = state.orders().advance_status(id).await?;
    Ok(Json(order.into()))
}
