//! `PostgreSQL` adapter.
//!
//! All queries are runtime queries (`sqlx::query_as` with `.bind`), so the
//! crate builds without a live database or an offline query cache.
//!
//! Loaders that must run both on the pool and inside a transaction take a
//! `&mut PgConnection`; pool callers acquire a connection first.

mod books;
mod carts;
mod categories;
mod orders;
mod users;

use std::collections::{BTreeSet, HashMap};

use sqlx::{PgConnection, PgPool};

use bookstore_core::{
    BookId, CartId, CartItemId, CategoryId, Email, OrderId, OrderItemId, OrderStatus, Price,
    Quantity, RoleName, UserId,
};

use super::RepositoryError;
use crate::models::{Book, CartItem, Order, OrderItem, ShoppingCart, User};

pub use orders::PgTransaction;

/// Repository implementation backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// =============================================================================
// Row Types
// =============================================================================

/// Select list shared by every book query. Callers append `AND ...` filters,
/// then `GROUP BY b.id`.
const BOOK_SELECT: &str = r"
    SELECT b.id, b.title, b.author, b.isbn, b.price, b.description, b.cover_image,
           COALESCE(
               ARRAY_AGG(c.id ORDER BY c.id) FILTER (WHERE c.id IS NOT NULL),
               '{}'
           ) AS category_ids
    FROM bookstore.book b
    LEFT JOIN bookstore.book_category bc ON bc.book_id = b.id
    LEFT JOIN bookstore.category c ON c.id = bc.category_id AND NOT c.is_deleted
    WHERE NOT b.is_deleted
";

#[derive(sqlx::FromRow)]
struct BookRow {
    id: BookId,
    title: String,
    author: String,
    isbn: String,
    price: Price,
    description: String,
    cover_image: String,
    category_ids: Vec<i64>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            price: row.price,
            description: row.description,
            cover_image: row.cover_image,
            category_ids: row.category_ids.into_iter().map(CategoryId::new).collect(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: Email,
    first_name: String,
    last_name: String,
    shipping_address: String,
    roles: Vec<String>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| r.parse::<RoleName>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            shipping_address: row.shipping_address,
            roles,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    book_id: BookId,
    book_title: String,
    book_price: Price,
    quantity: i32,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            book_id: row.book_id,
            book_title: row.book_title,
            book_price: row.book_price,
            quantity: quantity_from_db(row.quantity)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    total: Price,
    order_date: chrono::DateTime<chrono::Utc>,
    shipping_address: String,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    book_id: BookId,
    quantity: i32,
    price: Price,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            book_id: row.book_id,
            quantity: quantity_from_db(row.quantity)?,
            price: row.price,
        })
    }
}

fn quantity_from_db(value: i32) -> Result<Quantity, RepositoryError> {
    Quantity::try_from(value).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid quantity in database: {e}"))
    })
}

// =============================================================================
// Shared Loaders
// =============================================================================

async fn fetch_book(
    conn: &mut PgConnection,
    id: BookId,
) -> Result<Option<Book>, RepositoryError> {
    // Using runtime query to avoid SQLx offline mode cache requirements
    let row = sqlx::query_as::<_, BookRow>(&format!("{BOOK_SELECT} AND b.id = $1 GROUP BY b.id"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.map(Book::from))
}

async fn fetch_user(
    conn: &mut PgConnection,
    id: UserId,
) -> Result<Option<User>, RepositoryError> {
    // Using runtime query to avoid SQLx offline mode cache requirements
    let row = sqlx::query_as::<_, UserRow>(
        r"
        SELECT u.id, u.email, u.first_name, u.last_name, u.shipping_address,
               COALESCE(
                   ARRAY_AGG(r.name::TEXT ORDER BY r.name) FILTER (WHERE r.id IS NOT NULL),
                   '{}'
               ) AS roles
        FROM bookstore.user u
        LEFT JOIN bookstore.user_role ur ON ur.user_id = u.id
        LEFT JOIN bookstore.role r ON r.id = ur.role_id
        WHERE u.id = $1 AND NOT u.is_deleted
        GROUP BY u.id
        ",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    row.map(User::try_from).transpose()
}

/// Cart header lookup; `lock` adds `FOR UPDATE` on the cart row.
fn cart_query(lock: bool) -> String {
    format!(
        r"
        SELECT id, user_id
        FROM bookstore.shopping_cart
        WHERE user_id = $1 AND NOT is_deleted
        {}
        ",
        if lock { "FOR UPDATE" } else { "" }
    )
}

/// Load a user's cart with its live items and their live books.
///
/// With `lock`, the cart row stays locked until the transaction ends, so
/// placements from the same cart run one after another.
async fn fetch_cart(
    conn: &mut PgConnection,
    user: UserId,
    lock: bool,
) -> Result<Option<ShoppingCart>, RepositoryError> {
    // Using runtime query to avoid SQLx offline mode cache requirements
    let cart: Option<(CartId, UserId)> = sqlx::query_as(&cart_query(lock))
        .bind(user)
        .fetch_optional(&mut *conn)
        .await?;

    let Some((cart_id, user_id)) = cart else {
        return Ok(None);
    };

    // Using runtime query to avoid SQLx offline mode cache requirements
    let rows = sqlx::query_as::<_, CartItemRow>(
        r"
        SELECT ci.id, ci.book_id, b.title AS book_title, b.price AS book_price, ci.quantity
        FROM bookstore.cart_item ci
        JOIN bookstore.book b ON b.id = ci.book_id
        WHERE ci.shopping_cart_id = $1 AND NOT ci.is_deleted AND NOT b.is_deleted
        ORDER BY ci.id
        ",
    )
    .bind(cart_id)
    .fetch_all(&mut *conn)
    .await?;

    let items = rows
        .into_iter()
        .map(CartItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(ShoppingCart {
        id: cart_id,
        user_id,
        items,
    }))
}

/// Load an order with its items; `lock` adds `FOR UPDATE` on the order row.
async fn fetch_order(
    conn: &mut PgConnection,
    id: OrderId,
    lock: bool,
) -> Result<Option<Order>, RepositoryError> {
    let sql = format!(
        r"
        SELECT id, user_id, status, total, order_date, shipping_address
        FROM bookstore.order
        WHERE id = $1 AND NOT is_deleted
        {}
        ",
        if lock { "FOR UPDATE" } else { "" }
    );

    // Using runtime query to avoid SQLx offline mode cache requirements
    let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let mut orders = attach_items(conn, vec![row]).await?;
    Ok(orders.pop())
}

/// Load the items of `rows` in one query and assemble the orders, keeping
/// the order of `rows`.
async fn attach_items(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, RepositoryError> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id.as_i64()).collect();

    // Using runtime query to avoid SQLx offline mode cache requirements
    let item_rows = sqlx::query_as::<_, OrderItemRow>(
        r"
        SELECT id, order_id, book_id, quantity, price
        FROM bookstore.order_item
        WHERE order_id = ANY($1) AND NOT is_deleted
        ORDER BY id
        ",
    )
    .bind(&ids)
    .fetch_all(conn)
    .await?;

    let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for row in item_rows {
        let item = OrderItem::try_from(row)?;
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(rows
        .into_iter()
        .map(|row| Order {
            items: items_by_order.remove(&row.id).unwrap_or_default(),
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            total: row.total,
            order_date: row.order_date,
            shipping_address: row.shipping_address,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_query_locks_only_when_asked() {
        assert!(cart_query(true).contains("FOR UPDATE"));
        assert!(!cart_query(false).contains("FOR UPDATE"));
    }
}
