use common::OrderId;
use domain::{CountryArea, Order, PassportOffice, RegisterOffice, Street};
use order_store::{DirectoryStore, OrderStore, OrderStoreExt, PendingOrdersQuery};

use crate::error::RegistryError;

type Result<T> = std::result::Result<T, RegistryError>;

/// Entry point for directory lookups and order persistence.
///
/// Cheap to share when `S` is; every call borrows the store independently.
#[derive(Debug, Clone)]
pub struct StudentOrderRegistry<S> {
    store: S,
    default_limit: usize,
}

impl<S: DirectoryStore + OrderStore> StudentOrderRegistry<S> {
    /// Creates a registry whose pending batches default to `default_limit` rows.
    pub fn new(store: S, default_limit: usize) -> Self {
        Self {
            store,
            default_limit,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Lists the direct children of an area; blank lists the countries.
    #[tracing::instrument(skip(self))]
    pub async fn find_child_areas(&self, area_id: &str) -> Result<Vec<CountryArea>> {
        let areas = self.store.find_child_areas(area_id).await?;
        tracing::debug!(count = areas.len(), "child areas found");
        Ok(areas)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_streets(&self, pattern: &str) -> Result<Vec<Street>> {
        Ok(self.store.find_streets(pattern).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_passport_offices(&self, area_id: &str) -> Result<Vec<PassportOffice>> {
        Ok(self.store.find_passport_offices(area_id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_register_offices(&self, area_id: &str) -> Result<Vec<RegisterOffice>> {
        Ok(self.store.find_register_offices(area_id).await?)
    }

    /// Persists a new order with its children. Not idempotent.
    #[tracing::instrument(skip(self, order), fields(children = order.children.len()))]
    pub async fn save_order(&self, order: &Order) -> Result<OrderId> {
        Ok(self.store.save_order(order).await?)
    }

    /// Reads pending orders, capping the joined rows at `limit`.
    #[tracing::instrument(skip(self))]
    pub async fn list_pending_orders(&self, limit: usize) -> Result<Vec<Order>> {
        Ok(self.store.list_pending_orders(limit).await?)
    }

    /// Reads pending orders with the configured default cap.
    pub async fn list_pending_orders_default(&self) -> Result<Vec<Order>> {
        self.list_pending_orders(self.default_limit).await
    }

    /// Reads orders with an explicit status and strategy.
    #[tracing::instrument(skip(self))]
    pub async fn query_orders(&self, query: PendingOrdersQuery) -> Result<Vec<Order>> {
        Ok(self.store.query_orders(query).await?)
    }
}
