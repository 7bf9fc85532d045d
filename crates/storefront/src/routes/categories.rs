//! Category route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bookstore_core::CategoryId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Category, NewCategory};
use crate::routes::PageQuery;
use crate::routes::books::BookSummaryResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<CategoryRequest> for NewCategory {
    fn from(request: CategoryRequest) -> Self {
        Self {
            name: request.name.trim().to_owned(),
            description: request.description.filter(|d| !d.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

/// List categories.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<CategoryResponse>>> {
    let categories = state.catalog().list_categories(page.into()).await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Show one category.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryResponse>> {
    let category = state.catalog().category(id).await?;
    Ok(Json(category.into()))
}

/// Books in a category, without their category ids.
#[instrument(skip(state))]
pub async fn books(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<BookSummaryResponse>>> {
    let books = state.catalog().books_by_category(id, page.into()).await?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// Create a category.
#[instrument(skip(state, request), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>> {
    let category = state.catalog().create_category(&request.into()).await?;
    Ok(Json(category.into()))
}

/// Replace a category.
#[instrument(skip(state, request), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>> {
    let category = state.catalog().update_category(id, &request.into()).await?;
    Ok(Json(category.into()))
}

/// Delete a category.
#[instrument(skip(state), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    state.catalog().delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
