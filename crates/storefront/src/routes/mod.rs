//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Liveness check
//! GET    /health/ready                   - Readiness check (database)
//!
//! # Auth
//! POST   /auth/registration              - Register a customer account
//! POST   /auth/login                     - Login (starts a session)
//! POST   /auth/logout                    - Logout
//!
//! # Books
//! GET    /books                          - Book listing
//! GET    /books/search                   - Search by title, author, isbn
//! GET    /books/{id}                     - Book detail
//! POST   /books                          - Create (admin)
//! PUT    /books/{id}                     - Replace (admin)
//! DELETE /books/{id}                     - Delete (admin)
//!
//! # Categories
//! GET    /categories                     - Category listing
//! GET    /categories/{id}                - Category detail
//! GET    /categories/{id}/books          - Books in a category
//! POST   /categories                     - Create (admin)
//! PUT    /categories/{id}                - Replace (admin)
//! DELETE /categories/{id}                - Delete (admin)
//!
//! # Cart (requires auth)
//! GET    /cart                           - Current user's cart
//! POST   /cart                           - Add a line
//! PUT    /cart/cart-items/{id}           - Change a line's quantity
//! DELETE /cart/cart-items/{id}           - Remove a line
//!
//! # Orders (requires auth)
//! POST   /orders                         - Place an order from the cart
//! GET    /orders                         - Order history
//! GET    /orders/{id}/items              - Items of an order
//! GET    /orders/{id}/items/{itemId}     - One item of an order
//! PUT    /orders/{id}                    - Advance status (admin)
//! ```
//!
//! Listings accept `?page=0&size=20` (zero-based, size capped at 100).

pub mod auth;
pub mod books;
pub mod cart;
pub mod categories;
pub mod orders;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use crate::db::Page;
use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// `?page=&size=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        Self::new(
            query.page.unwrap_or(0),
            query.size.unwrap_or(Self::DEFAULT_SIZE),
        )
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/registration", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the book routes router.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::index).post(books::create))
        .route("/search", get(books::search))
        .route(
            "/{id}",
            get(books::show).put(books::update).delete(books::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/{id}/books", get(categories::books))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route(
            "/cart-items/{id}",
            put(cart::update).delete(cart::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::history).post(orders::place))
        .route("/{id}", put(orders::advance_status))
        .route("/{id}/items", get(orders::items))
        .route("/{id}/items/{item_id}", get(orders::item))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/books", book_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
}

/// Build the application router with health checks, sessions, request ids
/// and request tracing.
pub fn app<S>(state: AppState, sessions: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(sessions, state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .with_state(state)
}

fn make_span(request: &axum::http::Request<axum::body::Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.store().pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
