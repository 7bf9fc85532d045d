//! Integration tests for the order status lifecycle.

#![allow(clippy::unwrap_used)]

use bookstore_core::{OrderId, OrderStatus};
use bookstore_integration_tests::{add_to_cart, book, customer, place};
use bookstore_storefront::config::CartPolicy;
use bookstore_storefront::db::{MemoryStore, OrderRepository};
use bookstore_storefront::services::orders::{OrderError, OrderService};

#[tokio::test]
async fn test_full_lifecycle() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let dune = book(&store, "Dune", "Frank Herbert", "isbn-dune", 999).await;
    add_to_cart(&store, &reader, dune.id, 1).await;
    let order = place(&store, &reader).await;
    let service = OrderService::new(&store, CartPolicy::Retain);

    let delivered = service.advance_status(order.id).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let completed = service.advance_status(order.id).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    // Only the status moved.
    let stored = store.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
    assert_eq!(stored.total, order.total);
    assert_eq!(stored.items, order.items);
}

#[tokio::test]
async fn test_completed_is_terminal() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let order = place(&store, &reader).await;
    let service = OrderService::new(&store, CartPolicy::Retain);

    service.advance_status(order.id).await.unwrap();
    service.advance_status(order.id).await.unwrap();
    let result = service.advance_status(order.id).await;

    assert!(matches!(
        result,
        Err(OrderError::InvalidStateTransition {
            from: OrderStatus::Completed,
            ..
        })
    ));
    let stored = store.find_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_unknown_or_deleted_order() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let order = place(&store, &reader).await;
    let service = OrderService::new(&store, CartPolicy::Retain);

    let missing = service.advance_status(OrderId::new(9_999)).await;
    assert!(matches!(missing, Err(OrderError::OrderNotFound(_))));

    assert!(store.delete_order(order.id).await);
    let deleted = service.advance_status(order.id).await;
    assert!(matches!(deleted, Err(OrderError::OrderNotFound(id)) if id == order.id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_advances_apply_one_at_a_time() {
    let store = MemoryStore::new();
    let reader = customer(&store, "reader@example.com").await;
    let order_id = place(&store, &reader).await.id;

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                OrderService::new(&store, CartPolicy::Retain)
                    .advance_status(order_id)
                    .await
            })
        })
        .collect();

    let mut reached = Vec::new();
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => reached.push(order.status),
            Err(OrderError::InvalidStateTransition { .. }) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    reached.sort_by_key(|s| s.as_str());

    assert_eq!(reached, vec![OrderStatus::Completed, OrderStatus::Delivered]);
    assert_eq!(rejected, 1);
    let stored = store.find_order(order_id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Completed);
}
