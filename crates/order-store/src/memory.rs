use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{
    Child, ChildAreaPattern, CountryArea, Order, OrderStatus, PassportOffice, RegisterOffice,
    Street,
};
use tokio::sync::RwLock;

use crate::aggregator::{OrderRow, aggregate_rows, attach_children};
use crate::{
    DirectoryStore, FetchStrategy, OrderStore, PendingOrdersQuery, Result, StoreError,
};

#[derive(Default)]
struct Directory {
    areas: Vec<CountryArea>,
    streets: Vec<Street>,
    passport_offices: Vec<PassportOffice>,
    register_offices: Vec<RegisterOffice>,
}

#[derive(Default)]
struct OrderTables {
    last_order_id: i64,
    headers: BTreeMap<OrderId, Order>,
    children: Vec<(OrderId, Child)>,
}

impl OrderTables {
    fn children_of(&self, order_id: OrderId) -> impl Iterator<Item = &Child> {
        self.children
            .iter()
            .filter(move |(owner, _)| *owner == order_id)
            .map(|(_, child)| child)
    }
}

/// A header joined with one of its children, borrowed from the tables.
struct JoinedRow<'a> {
    order_id: OrderId,
    header: &'a Order,
    child: &'a Child,
}

impl OrderRow for JoinedRow<'_> {
    fn order_id(&self) -> Result<OrderId> {
        Ok(self.order_id)
    }

    fn header(&self) -> Result<Order> {
        Ok(self.header.clone())
    }

    fn child(&self) -> Result<Child> {
        Ok(self.child.clone())
    }
}

/// In-memory store implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation. A header and
/// its children are written under one lock, so readers never observe a
/// partial order. [`InMemoryStore::fail_next_children_batch`] makes the next
/// write fail after its header insert, exercising the rollback path.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    directory: Arc<RwLock<Directory>>,
    tables: Arc<RwLock<OrderTables>>,
    fail_children_batch: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_area(&self, area: CountryArea) {
        self.directory.write().await.areas.push(area);
    }

    pub async fn add_street(&self, street: Street) {
        self.directory.write().await.streets.push(street);
    }

    pub async fn add_passport_office(&self, office: PassportOffice) {
        self.directory.write().await.passport_offices.push(office);
    }

    pub async fn add_register_office(&self, office: RegisterOffice) {
        self.directory.write().await.register_offices.push(office);
    }

    /// Makes the next `save_order` fail while writing its children.
    pub fn fail_next_children_batch(&self) {
        self.fail_children_batch.store(true, Ordering::SeqCst);
    }

    /// Returns the number of stored order headers.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.headers.len()
    }

    /// Returns the number of stored child rows.
    pub async fn child_count(&self) -> usize {
        self.tables.read().await.children.len()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn find_child_areas(&self, area_id: &str) -> Result<Vec<CountryArea>> {
        let predicate = ChildAreaPattern::for_area(area_id)?;
        metrics::counter!("area_lookups_total").increment(1);

        let directory = self.directory.read().await;
        let mut areas: Vec<_> = directory
            .areas
            .iter()
            .filter(|area| predicate.matches(&area.area_id.to_string()))
            .cloned()
            .collect();
        areas.sort_by_key(|area| area.area_id);
        Ok(areas)
    }

    async fn find_streets(&self, pattern: &str) -> Result<Vec<Street>> {
        let needle = pattern.to_uppercase();
        let directory = self.directory.read().await;
        let mut streets: Vec<_> = directory
            .streets
            .iter()
            .filter(|street| street.name.to_uppercase().contains(&needle))
            .cloned()
            .collect();
        streets.sort_by_key(|street| street.code);
        Ok(streets)
    }

    async fn find_passport_offices(&self, area_id: &str) -> Result<Vec<PassportOffice>> {
        let directory = self.directory.read().await;
        Ok(directory
            .passport_offices
            .iter()
            .filter(|office| office.area_id.to_string() == area_id)
            .cloned()
            .collect())
    }

    async fn find_register_offices(&self, area_id: &str) -> Result<Vec<RegisterOffice>> {
        let directory = self.directory.read().await;
        Ok(directory
            .register_offices
            .iter()
            .filter(|office| office.area_id.to_string() == area_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn save_order(&self, order: &Order) -> Result<OrderId> {
        let mut tables = self.tables.write().await;

        tables.last_order_id += 1;
        let order_id = OrderId::new(tables.last_order_id);
        let header = Order::restore(
            order_id,
            Utc::now(),
            OrderStatus::Start,
            order.husband.clone(),
            order.wife.clone(),
            order.marriage.clone(),
        );
        tables.headers.insert(order_id, header);

        if self.fail_children_batch.swap(false, Ordering::SeqCst) {
            tables.headers.remove(&order_id);
            tracing::warn!(%order_id, "children batch failed, header rolled back");
            metrics::counter!("orders_save_failed_total").increment(1);
            return Err(StoreError::InjectedFailure("children batch"));
        }

        tables
            .children
            .extend(order.children.iter().cloned().map(|child| (order_id, child)));

        metrics::counter!("orders_saved_total").increment(1);
        Ok(order_id)
    }

    async fn query_orders(&self, query: PendingOrdersQuery) -> Result<Vec<Order>> {
        let guard = self.tables.read().await;
        let tables: &OrderTables = &guard;

        let orders = match query.strategy {
            FetchStrategy::SingleJoin => {
                let rows: Vec<JoinedRow<'_>> = tables
                    .headers
                    .iter()
                    .filter(|(_, header)| header.status() == query.status)
                    .flat_map(|(&order_id, header)| {
                        tables.children_of(order_id).map(move |child| JoinedRow {
                            order_id,
                            header,
                            child,
                        })
                    })
                    .take(query.limit)
                    .collect();

                aggregate_rows(&rows, query.limit)?
            }
            FetchStrategy::HeadersThenChildren => {
                let mut headers: Vec<&Order> = tables
                    .headers
                    .values()
                    .filter(|header| header.status() == query.status)
                    .collect();
                headers.sort_by_key(|header| (header.created_at(), header.id()));

                let orders: Vec<Order> = headers
                    .into_iter()
                    .take(query.limit)
                    .cloned()
                    .collect();
                let ids: HashSet<OrderId> = orders.iter().filter_map(Order::id).collect();
                let children = tables
                    .children
                    .iter()
                    .filter(|(owner, _)| ids.contains(owner))
                    .cloned();

                attach_children(orders, children)?
            }
        };

        metrics::counter!("pending_orders_loaded_total").increment(orders.len() as u64);
        Ok(orders)
    }
}
