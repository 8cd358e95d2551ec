use async_trait::async_trait;
use common::OrderId;
use domain::{CountryArea, Order, PassportOffice, RegisterOffice, Street};

use crate::{PendingOrdersQuery, Result};

/// Read-only lookups into the reference directories.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Lists the direct children of an area.
    ///
    /// A blank `area_id` lists the top level. Fails with `InvalidArgument`
    /// when `area_id` is not a valid non-leaf area code.
    async fn find_child_areas(&self, area_id: &str) -> Result<Vec<CountryArea>>;

    /// Finds streets whose name contains `pattern`, ignoring case.
    async fn find_streets(&self, pattern: &str) -> Result<Vec<Street>>;

    /// Lists passport offices located exactly in `area_id`.
    async fn find_passport_offices(&self, area_id: &str) -> Result<Vec<PassportOffice>>;

    /// Lists civil-registry offices located exactly in `area_id`.
    async fn find_register_offices(&self, area_id: &str) -> Result<Vec<RegisterOffice>>;
}

/// Persistence of student orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes an order header and all of its children atomically.
    ///
    /// The stored status is always the initial status and the creation
    /// timestamp is the current time; the values carried by `order` are
    /// ignored. Returns the store-assigned identifier. Not idempotent.
    async fn save_order(&self, order: &Order) -> Result<OrderId>;

    /// Reads a batch of orders with their children.
    async fn query_orders(&self, query: PendingOrdersQuery) -> Result<Vec<Order>>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Reads pending orders with the single-join strategy.
    ///
    /// `limit` caps the joined rows fetched, not the orders returned.
    async fn list_pending_orders(&self, limit: usize) -> Result<Vec<Order>> {
        self.query_orders(PendingOrdersQuery::new(limit)).await
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
