//! Integration tests for turning a cart into an order.

#![allow(clippy::unwrap_used)]

use bookstore_core::{OrderStatus, Price};
use bookstore_integration_tests::{FailingStore, add_to_cart, book, customer, price};
use bookstore_storefront::config::CartPolicy;
use bookstore_storefront::db::{CartRepository, MemoryStore, OrderRepository, Page};
use bookstore_storefront::services::orders::{OrderError, OrderService};

#[tokio::test]
async fn test_order_snapshots_cart_lines() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let dune = book(&store, "Dune", "Frank Herbert", "isbn-dune", 999).await;
    let emma = book(&store, "Emma", "Jane Austen", "isbn-emma", 1250).await;
    add_to_cart(&store, &reader, dune.id, 2).await;
    add_to_cart(&store, &reader, emma.id, 1).await;

    let order = OrderService::new(&store, CartPolicy::Retain)
        .place_order(&reader, "  221B Baker Street  ")
        .await
        .unwrap();

    assert_eq!(order.user_id, reader.id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.shipping_address, "221B Baker Street");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].book_id, dune.id);
    assert_eq!(order.items[0].price, price(1998));
    assert_eq!(order.items[1].price, price(1250));
    assert_eq!(order.total, price(3248));
    assert_eq!(order.total, order.items_total());

    // What was returned is what was stored.
    let stored = store.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored, order);
}

#[tokio::test]
async fn test_empty_cart_places_empty_order() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;

    let order = OrderService::new(&store, CartPolicy::Retain)
        .place_order(&reader, "1 Empty Road")
        .await
        .unwrap();

    assert!(order.items.is_empty());
    assert_eq!(order.total, Price::zero());
    assert_eq!(store.order_count().await, 1);
}

#[tokio::test]
async fn test_blank_address_is_rejected_before_writing() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;

    let result = OrderService::new(&store, CartPolicy::Retain)
        .place_order(&reader, "   ")
        .await;

    assert!(matches!(result, Err(OrderError::Validation(_))));
    assert_eq!(store.order_count().await, 0);
}

#[tokio::test]
async fn test_retain_policy_keeps_cart() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let dune = book(&store, "Dune", "Frank Herbert", "isbn-dune", 999).await;
    add_to_cart(&store, &reader, dune.id, 1).await;

    OrderService::new(&store, CartPolicy::Retain)
        .place_order(&reader, "221B Baker Street")
        .await
        .unwrap();

    let cart = store.find_cart(reader.id).await.unwrap().unwrap();
    assert_eq!(cart.items.len(), 1);
}

#[tokio::test]
async fn test_clear_policy_empties_cart() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let dune = book(&store, "Dune", "Frank Herbert", "isbn-dune", 999).await;
    add_to_cart(&store, &reader, dune.id, 3).await;

    let order = OrderService::new(&store, CartPolicy::Clear)
        .place_order(&reader, "221B Baker Street")
        .await
        .unwrap();

    assert_eq!(order.total, price(2997));
    let cart = store.find_cart(reader.id).await.unwrap().unwrap();
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn test_later_price_change_does_not_touch_order() {
    use bookstore_storefront::db::BookRepository;
    use bookstore_storefront::models::NewBook;

    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let dune = book(&store, "Dune", "Frank Herbert", "isbn-dune", 999).await;
    add_to_cart(&store, &reader, dune.id, 1).await;
    let order = OrderService::new(&store, CartPolicy::Retain)
        .place_order(&reader, "221B Baker Street")
        .await
        .unwrap();

    store
        .update_book(
            dune.id,
            &NewBook {
                title: dune.title.clone(),
                author: dune.author.clone(),
                isbn: dune.isbn.clone(),
                price: price(2500),
                description: dune.description.clone(),
                cover_image: dune.cover_image.clone(),
                category_ids: dune.category_ids.clone(),
            },
        )
        .await
        .unwrap();

    let stored = store.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.total, price(999));
}

#[tokio::test]
async fn test_failure_mid_placement_persists_nothing() {
    let memory = MemoryStore::new();
    let reader = customer(&memory, "reader@example.com").await;
    let dune = book(&memory, "Dune", "Frank Herbert", "isbn-dune", 999).await;
    let emma = book(&memory, "Emma", "Jane Austen", "isbn-emma", 1250).await;
    add_to_cart(&memory, &reader, dune.id, 1).await;
    add_to_cart(&memory, &reader, emma.id, 1).await;

    let failing = FailingStore::new(memory.clone(), 1);
    let result = OrderService::new(&failing, CartPolicy::Clear)
        .place_order(&reader, "221B Baker Street")
        .await;

    assert!(matches!(result, Err(OrderError::Repository(_))));
    assert_eq!(memory.order_count().await, 0);
    assert!(
        memory
            .orders_by_user(reader.id, Page::default())
            .await
            .unwrap()
            .is_empty()
    );
    // The clear never happened either.
    let cart = memory.find_cart(reader.id).await.unwrap().unwrap();
    assert_eq!(cart.items.len(), 2);
}

#[tokio::test]
async fn test_deleted_book_drops_out_of_cart_and_order() {
    use bookstore_core::Quantity;
    use bookstore_storefront::db::{BookRepository, RepositoryError};

    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let dune = book(&store, "Dune", "Frank Herbert", "isbn-dune", 999).await;
    let emma = book(&store, "Emma", "Jane Austen", "isbn-emma", 1250).await;
    add_to_cart(&store, &reader, dune.id, 2).await;
    let cart = add_to_cart(&store, &reader, emma.id, 1).await;

    assert!(store.delete_book(dune.id).await.unwrap());

    let cart_now = store.find_cart(reader.id).await.unwrap().unwrap();
    assert_eq!(cart_now.items.len(), 1);
    assert_eq!(cart_now.items[0].book_id, emma.id);

    let order = OrderService::new(&store, CartPolicy::Retain)
        .place_order(&reader, "221B Baker Street")
        .await
        .unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].book_id, emma.id);
    assert_eq!(order.total, price(1250));

    let re_add = store
        .add_cart_item(cart.id, dune.id, Quantity::new(1).unwrap())
        .await;
    assert!(matches!(re_add, Err(RepositoryError::NotFound)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_placements_consume_cart_once() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let dune = book(&store, "Dune", "Frank Herbert", "isbn-dune", 999).await;
    let emma = book(&store, "Emma", "Jane Austen", "isbn-emma", 1250).await;
    add_to_cart(&store, &reader, dune.id, 1).await;
    add_to_cart(&store, &reader, emma.id, 2).await;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = store.clone();
            let reader = reader.clone();
            tokio::spawn(async move {
                OrderService::new(&store, CartPolicy::Clear)
                    .place_order(&reader, "221B Baker Street")
                    .await
            })
        })
        .collect();

    let mut orders = Vec::new();
    for handle in handles {
        orders.push(handle.await.unwrap().unwrap());
    }
    let filled: Vec<_> = orders.iter().filter(|o| !o.items.is_empty()).collect();

    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].items.len(), 2);
    assert_eq!(filled[0].total, price(3499));
    assert!(
        orders
            .iter()
            .filter(|o| o.items.is_empty())
            .all(|o| o.total == Price::zero())
    );
    let cart = store.find_cart(reader.id).await.unwrap().unwrap();
    assert!(cart.items.is_empty());
}
