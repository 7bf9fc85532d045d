//! In-memory store.
//!
//! Implements every repository trait over plain maps guarded by a tokio
//! mutex. A transaction holds the mutex for its whole lifetime and works on
//! a copy of the tables; `commit` swaps the copy in, dropping discards it.
//! That gives the same all-or-nothing and serialised-writer behaviour as the
//! `PostgreSQL` adapter.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use bookstore_core::{
    BookId, BookPredicate, CartId, CartItemId, CategoryId, Email, OrderId, OrderItemId,
    OrderStatus, Price, Quantity, RoleId, RoleName, UserId,
};

use super::{
    BookRepository, CartRepository, CategoryRepository, OrderRepository, OrderTransaction, Page,
    RepositoryError, UnitOfWork, UserRepository,
};
use crate::models::{
    Book, CartItem, Category, NewBook, NewCategory, NewOrder, NewOrderItem, NewUser, Order,
    OrderItem, ShoppingCart, User,
};

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Clone)]
struct UserRecord {
    email: Email,
    password_hash: String,
    first_name: String,
    last_name: String,
    shipping_address: String,
    roles: BTreeSet<RoleId>,
}

#[derive(Debug, Clone)]
struct BookRecord {
    book: Book,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct CategoryRecord {
    category: Category,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct CartItemRecord {
    cart_id: CartId,
    book_id: BookId,
    quantity: Quantity,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct OrderRecord {
    order: NewOrder,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct OrderItemRecord {
    item: OrderItem,
    deleted: bool,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    last_id: i64,
    roles: BTreeMap<RoleName, RoleId>,
    users: BTreeMap<UserId, UserRecord>,
    books: BTreeMap<BookId, BookRecord>,
    categories: BTreeMap<CategoryId, CategoryRecord>,
    carts: BTreeMap<CartId, UserId>,
    cart_items: BTreeMap<CartItemId, CartItemRecord>,
    orders: BTreeMap<OrderId, OrderRecord>,
    order_items: BTreeMap<OrderItemId, OrderItemRecord>,
}

impl Tables {
    const fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn is_live_category(&self, id: CategoryId) -> bool {
        self.categories.get(&id).is_some_and(|c| !c.deleted)
    }

    fn live_categories(&self, ids: &BTreeSet<CategoryId>) -> BTreeSet<CategoryId> {
        ids.iter()
            .copied()
            .filter(|id| self.is_live_category(*id))
            .collect()
    }

    fn book_view(&self, record: &BookRecord) -> Book {
        Book {
            category_ids: self.live_categories(&record.book.category_ids),
            ..record.book.clone()
        }
    }

    fn live_books(&self) -> impl Iterator<Item = Book> + '_ {
        self.books
            .values()
            .filter(|r| !r.deleted)
            .map(|r| self.book_view(r))
    }

    fn book(&self, id: BookId) -> Option<Book> {
        self.books
            .get(&id)
            .filter(|r| !r.deleted)
            .map(|r| self.book_view(r))
    }

    fn isbn_taken(&self, isbn: &str, except: Option<BookId>) -> bool {
        self.books
            .iter()
            .any(|(id, r)| r.book.isbn == isbn && Some(*id) != except)
    }

    fn user(&self, id: UserId) -> Option<User> {
        let record = self.users.get(&id)?;
        let roles = self
            .roles
            .iter()
            .filter(|(_, role_id)| record.roles.contains(role_id))
            .map(|(name, _)| *name)
            .collect();

        Some(User {
            id,
            email: record.email.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            shipping_address: record.shipping_address.clone(),
            roles,
        })
    }

    fn cart(&self, user: UserId) -> Option<ShoppingCart> {
        let (cart_id, _) = self.carts.iter().find(|(_, owner)| **owner == user)?;
        let items = self
            .cart_items
            .iter()
            .filter(|(_, r)| r.cart_id == *cart_id && !r.deleted)
            .filter_map(|(id, r)| {
                let book = &self.books.get(&r.book_id).filter(|b| !b.deleted)?.book;
                Some(CartItem {
                    id: *id,
                    book_id: r.book_id,
                    book_title: book.title.clone(),
                    book_price: book.price,
                    quantity: r.quantity,
                })
            })
            .collect();

        Some(ShoppingCart {
            id: *cart_id,
            user_id: user,
            items,
        })
    }

    fn order(&self, id: OrderId) -> Option<Order> {
        let record = self.orders.get(&id).filter(|r| !r.deleted)?;
        let items = self
            .order_items
            .values()
            .filter(|r| r.item.order_id == id && !r.deleted)
            .map(|r| r.item.clone())
            .collect();

        Some(Order {
            id,
            user_id: record.order.user_id,
            status: record.order.status,
            total: record.order.total,
            order_date: record.order.order_date,
            shipping_address: record.order.shipping_address.clone(),
            items,
        })
    }

    fn clear_cart(&mut self, cart: CartId) -> u64 {
        let mut cleared = 0;
        for record in self.cart_items.values_mut() {
            if record.cart_id == cart && !record.deleted {
                record.deleted = true;
                cleared += 1;
            }
        }
        cleared
    }
}

// =============================================================================
// Store
// =============================================================================

/// Repository implementation held entirely in memory.
///
/// Cloning is cheap and clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft-delete an order and its items. Returns `false` if it was not live.
    pub async fn delete_order(&self, id: OrderId) -> bool {
        let mut tables = self.tables.lock().await;
        let Some(record) = tables.orders.get_mut(&id).filter(|r| !r.deleted) else {
            return false;
        };
        record.deleted = true;
        for item in tables.order_items.values_mut() {
            if item.item.order_id == id {
                item.deleted = true;
            }
        }
        true
    }

    /// Number of live orders, across all users.
    pub async fn order_count(&self) -> usize {
        self.tables
            .lock()
            .await
            .orders
            .values()
            .filter(|r| !r.deleted)
            .count()
    }
}

impl BookRepository for MemoryStore {
    async fn find_book(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        Ok(self.tables.lock().await.book(id))
    }

    async fn list_books(&self, page: Page) -> Result<Vec<Book>, RepositoryError> {
        Ok(page.slice(self.tables.lock().await.live_books()))
    }

    async fn search_books(
        &self,
        predicate: &BookPredicate,
        page: Page,
    ) -> Result<Vec<Book>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(page.slice(tables.live_books().filter(|b| predicate.matches(b))))
    }

    async fn books_by_category(
        &self,
        category: CategoryId,
        page: Page,
    ) -> Result<Vec<Book>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(page.slice(
            tables
                .live_books()
                .filter(|b| b.category_ids.contains(&category)),
        ))
    }

    async fn insert_book(&self, book: &NewBook) -> Result<Book, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.isbn_taken(&book.isbn, None) {
            return Err(RepositoryError::Conflict("isbn already exists".to_owned()));
        }

        let id = BookId::new(tables.next_id());
        let mut stored = book.clone().into_book(id);
        stored.category_ids = tables.live_categories(&book.category_ids);
        tables.books.insert(
            id,
            BookRecord {
                book: stored.clone(),
                deleted: false,
            },
        );
        Ok(stored)
    }

    async fn update_book(&self, id: BookId, book: &NewBook) -> Result<Option<Book>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.book(id).is_none() {
            return Ok(None);
        }
        if tables.isbn_taken(&book.isbn, Some(id)) {
            return Err(RepositoryError::Conflict("isbn already exists".to_owned()));
        }

        let mut stored = book.clone().into_book(id);
        stored.category_ids = tables.live_categories(&book.category_ids);
        tables.books.insert(
            id,
            BookRecord {
                book: stored.clone(),
                deleted: false,
            },
        );
        Ok(Some(stored))
    }

    async fn delete_book(&self, id: BookId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(match tables.books.get_mut(&id) {
            Some(record) if !record.deleted => {
                record.deleted = true;
                true
            }
            _ => false,
        })
    }
}

impl CategoryRepository for MemoryStore {
    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .get(&id)
            .filter(|r| !r.deleted)
            .map(|r| r.category.clone()))
    }

    async fn list_categories(&self, page: Page) -> Result<Vec<Category>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(page.slice(
            tables
                .categories
                .values()
                .filter(|r| !r.deleted)
                .map(|r| r.category.clone()),
        ))
    }

    async fn insert_category(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let id = CategoryId::new(tables.next_id());
        let stored = Category {
            id,
            name: category.name.clone(),
            description: category.description.clone(),
        };
        tables.categories.insert(
            id,
            CategoryRecord {
                category: stored.clone(),
                deleted: false,
            },
        );
        Ok(stored)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        category: &NewCategory,
    ) -> Result<Option<Category>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(record) = tables.categories.get_mut(&id).filter(|r| !r.deleted) else {
            return Ok(None);
        };
        record.category.name.clone_from(&category.name);
        record.category.description.clone_from(&category.description);
        Ok(Some(record.category.clone()))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(match tables.categories.get_mut(&id) {
            Some(record) if !record.deleted => {
                record.deleted = true;
                true
            }
            _ => false,
        })
    }
}

impl CartRepository for MemoryStore {
    async fn find_cart(&self, user: UserId) -> Result<Option<ShoppingCart>, RepositoryError> {
        Ok(self.tables.lock().await.cart(user))
    }

    async fn create_cart(&self, user: UserId) -> Result<ShoppingCart, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.carts.values().any(|owner| *owner == user) {
            return Err(RepositoryError::Conflict("cart already exists".to_owned()));
        }
        let id = CartId::new(tables.next_id());
        tables.carts.insert(id, user);
        Ok(ShoppingCart::empty(id, user))
    }

    async fn add_cart_item(
        &self,
        cart: CartId,
        book: BookId,
        quantity: Quantity,
    ) -> Result<CartItemId, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let live_book = tables.books.get(&book).is_some_and(|b| !b.deleted);
        if !tables.carts.contains_key(&cart) || !live_book {
            return Err(RepositoryError::NotFound);
        }
        let id = CartItemId::new(tables.next_id());
        tables.cart_items.insert(
            id,
            CartItemRecord {
                cart_id: cart,
                book_id: book,
                quantity,
                deleted: false,
            },
        );
        Ok(id)
    }

    async fn update_cart_item(
        &self,
        item: CartItemId,
        quantity: Quantity,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(match tables.cart_items.get_mut(&item) {
            Some(record) if !record.deleted => {
                record.quantity = quantity;
                true
            }
            _ => false,
        })
    }

    async fn delete_cart_item(&self, item: CartItemId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(match tables.cart_items.get_mut(&item) {
            Some(record) if !record.deleted => {
                record.deleted = true;
                true
            }
            _ => false,
        })
    }
}

impl UserRepository for MemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.lock().await.user(id))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.lock().await;
        let found = tables
            .users
            .iter()
            .find(|(_, r)| r.email == *email)
            .map(|(id, r)| (*id, r.password_hash.clone()));

        Ok(found.and_then(|(id, hash)| tables.user(id).map(|user| (user, hash))))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|r| r.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let role_id = match tables.roles.get(&user.role) {
            Some(id) => *id,
            None => {
                let id = RoleId::new(tables.next_id());
                tables.roles.insert(user.role, id);
                id
            }
        };

        let id = UserId::new(tables.next_id());
        tables.users.insert(
            id,
            UserRecord {
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                shipping_address: user.shipping_address.clone(),
                roles: BTreeSet::from([role_id]),
            },
        );
        let cart_id = CartId::new(tables.next_id());
        tables.carts.insert(cart_id, id);

        tables.user(id).ok_or(RepositoryError::NotFound)
    }
}

impl OrderRepository for MemoryStore {
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.lock().await.order(id))
    }

    async fn orders_by_user(&self, user: UserId, page: Page) -> Result<Vec<Order>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|(_, r)| r.order.user_id == user && !r.deleted)
            .filter_map(|(id, _)| tables.order(*id))
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(b.id.cmp(&a.id)));
        Ok(page.slice(orders))
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// Exclusive transaction over a [`MemoryStore`].
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl UnitOfWork for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, RepositoryError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTransaction { guard, working })
    }
}

impl OrderTransaction for MemoryTransaction {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.working.user(id))
    }

    async fn find_cart(&mut self, user: UserId) -> Result<Option<ShoppingCart>, RepositoryError> {
        Ok(self.working.cart(user))
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        if !self.working.users.contains_key(&order.user_id) {
            return Err(RepositoryError::NotFound);
        }
        let id = OrderId::new(self.working.next_id());
        self.working.orders.insert(
            id,
            OrderRecord {
                order: order.clone(),
                deleted: false,
            },
        );
        Ok(id)
    }

    async fn insert_order_item(
        &mut self,
        order: OrderId,
        item: &NewOrderItem,
    ) -> Result<OrderItem, RepositoryError> {
        if !self.working.orders.contains_key(&order) {
            return Err(RepositoryError::NotFound);
        }
        let stored = OrderItem {
            id: OrderItemId::new(self.working.next_id()),
            order_id: order,
            book_id: item.book_id,
            quantity: item.quantity,
            price: item.price,
        };
        self.working.order_items.insert(
            stored.id,
            OrderItemRecord {
                item: stored.clone(),
                deleted: false,
            },
        );
        Ok(stored)
    }

    async fn set_order_total(&mut self, order: OrderId, total: Price) -> Result<(), RepositoryError> {
        let record = self
            .working
            .orders
            .get_mut(&order)
            .ok_or(RepositoryError::NotFound)?;
        record.order.total = total;
        Ok(())
    }

    async fn clear_cart(&mut self, cart: CartId) -> Result<u64, RepositoryError> {
        Ok(self.working.clear_cart(cart))
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.working.order(id))
    }

    async fn set_order_status(
        &mut self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let record = self
            .working
            .orders
            .get_mut(&order)
            .ok_or(RepositoryError::NotFound)?;
        record.order.status = status;
        Ok(())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        let Self { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}
