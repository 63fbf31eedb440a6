// checkout_core/src/repository.rs

//! Order persistence port and its in-memory implementation.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::CheckoutResult;
use crate::model::order::{Order, OrderToken};

/// Stores orders keyed by their cart token.
///
/// `save` replaces the whole stored order, so a caller that mutates a copy and saves
/// only on success gets all-or-nothing commands.
#[async_trait]
pub trait OrderRepository: Send + Sync {
  async fn find_by_token(&self, token: &OrderToken) -> CheckoutResult<Option<Order>>;

  async fn save(&self, order: &Order) -> CheckoutResult<()>;

  /// Stores `order` only if its token is unused, atomically. Returns `false` when
  /// another order already holds the token.
  async fn insert_new(&self, order: &Order) -> CheckoutResult<bool>;

  async fn exists(&self, token: &OrderToken) -> CheckoutResult<bool> {
    Ok(self.find_by_token(token).await?.is_some())
  }
}

#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
  orders: RwLock<HashMap<OrderToken, Order>>,
}

impl InMemoryOrderRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.orders.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.orders.read().is_empty()
  }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
  async fn find_by_token(&self, token: &OrderToken) -> CheckoutResult<Option<Order>> {
    Ok(self.orders.read().get(token).cloned())
  }

  async fn save(&self, order: &Order) -> CheckoutResult<()> {
    self.orders.write().insert(order.token.clone(), order.clone());
    Ok(())
  }

  async fn insert_new(&self, order: &Order) -> CheckoutResult<bool> {
    match self.orders.write().entry(order.token.clone()) {
      Entry::Occupied(_) => Ok(false),
      Entry::Vacant(slot) => {
        slot.insert(order.clone());
        Ok(true)
      }
    }
  }

  async fn exists(&self, token: &OrderToken) -> CheckoutResult<bool> {
    Ok(self.orders.read().contains_key(token))
  }
}
