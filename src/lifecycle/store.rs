//! In-memory storage shared by all shop services.
//!
//! Every operation takes the single inventory lock once, so a stock check and the
//! matching decrement can never interleave with another order.
//!
//! The audit trail is bounded: once it holds [`AUDIT_CAPACITY`] entries (or the
//! capacity given to [`Store::with_audit_capacity`]) the oldest entry is dropped.

use crate::model::{Order, OrderId, Product, ProductId, User, UserId};
use crate::order_service::OrderError;
use crate::user_service::UserError;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Default number of audit entries kept.
pub const AUDIT_CAPACITY: usize = 1024;

#[derive(Default)]
struct Inventory {
    users: HashMap<UserId, User>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    audit: VecDeque<String>,
    next_id: u32,
}

impl Inventory {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe store for users, products, orders and the audit trail.
pub struct Store {
    inventory: Mutex<Inventory>,
    audit_capacity: usize,
}

impl Default for Store {
    fn default() -> Self {
        Self::with_audit_capacity(AUDIT_CAPACITY)
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store keeping at most `capacity` audit entries.
    pub fn with_audit_capacity(capacity: usize) -> Self {
        Self {
            inventory: Mutex::new(Inventory::default()),
            audit_capacity: capacity,
        }
    }

    /// Registers a user; emails are unique.
    pub fn insert_user(&self, name: &str, email: &str) -> Result<User, UserError> {
        let mut inventory = self.lock();
        if inventory.users.values().any(|user| user.email == email) {
            return Err(UserError::AlreadyExists(email.to_string()));
        }
        let id = UserId(inventory.next_id());
        let user = User::new(id, name, email);
        inventory.users.insert(id, user.clone());
        debug!(%id, "Stored user");
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.lock().users.get(&id).cloned()
    }

    pub fn insert_product(&self, name: &str, price: f64, stock: u32) -> Product {
        let mut inventory = self.lock();
        let id = ProductId(inventory.next_id());
        let product = Product::new(id, name, price, stock);
        inventory.products.insert(id, product.clone());
        debug!(%id, stock, "Stored product");
        product
    }

    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.lock().products.get(&id).cloned()
    }

    /// Reserves stock and records the order in one step.
    pub fn place_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Order, OrderError> {
        let mut inventory = self.lock();
        if !inventory.users.contains_key(&user_id) {
            return Err(OrderError::InvalidUser(user_id));
        }
        let product = inventory
            .products
            .get_mut(&product_id)
            .ok_or(OrderError::InvalidProduct(product_id))?;
        if product.stock < quantity {
            return Err(OrderError::InsufficientStock {
                product_id,
                requested: quantity,
                available: product.stock,
            });
        }
        product.stock -= quantity;
        let total = product.price * f64::from(quantity);

        let id = OrderId(inventory.next_id());
        let order = Order::new(id, user_id, product_id, quantity, total);
        inventory.orders.insert(id, order.clone());
        debug!(%id, total, "Stored order");
        Ok(order)
    }

    /// Marks an order as priority and takes `percent` off its total.
    pub fn apply_discount(&self, id: OrderId, percent: f64) -> Option<Order> {
        let mut inventory = self.lock();
        let order = inventory.orders.get_mut(&id)?;
        let discount = order.total * percent / 100.0;
        order.discount = discount;
        order.total -= discount;
        order.priority = true;
        Some(order.clone())
    }

    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.lock().orders.get(&id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    /// Appends an entry, evicting the oldest ones beyond the audit capacity.
    pub fn record_audit(&self, entry: impl Into<String>) {
        let mut inventory = self.lock();
        inventory.audit.push_back(entry.into());
        while inventory.audit.len() > self.audit_capacity {
            inventory.audit.pop_front();
        }
    }

    /// Snapshot of the retained audit trail, oldest first.
    pub fn audit_log(&self) -> Vec<String> {
        self.lock().audit.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inventory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
