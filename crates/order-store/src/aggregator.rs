//! Rebuilds order graphs from flattened rows.
//!
//! A joined read returns one row per child, each repeating its order's header
//! columns. [`OrderAggregation`] folds such rows into whole [`Order`]s, and
//! [`apply_row_budget`] enforces the soft pagination rule afterwards.

use std::collections::HashMap;

use common::OrderId;
use domain::{Child, Order};

use crate::{Result, StoreError};

/// One flattened row: an order header plus exactly one child.
pub trait OrderRow {
    /// Identifier of the order the row belongs to.
    fn order_id(&self) -> Result<OrderId>;

    /// Decodes the header portion. Called once per distinct order.
    fn header(&self) -> Result<Order>;

    /// Decodes the child portion.
    fn child(&self) -> Result<Child>;
}

/// Fold state: orders in first-seen order, indexed by identifier.
#[derive(Debug, Default)]
pub struct OrderAggregation {
    orders: Vec<Order>,
    index: HashMap<OrderId, usize>,
    rows: usize,
}

impl OrderAggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one row into the aggregation.
    ///
    /// The header is decoded only the first time an identifier is seen; later
    /// rows for that order contribute their child only.
    pub fn push<R: OrderRow + ?Sized>(mut self, row: &R) -> Result<Self> {
        let order_id = row.order_id()?;

        let slot = match self.index.get(&order_id) {
            Some(&slot) => slot,
            None => {
                let order = row.header()?;
                self.orders.push(order);
                let slot = self.orders.len() - 1;
                self.index.insert(order_id, slot);
                slot
            }
        };

        let child = row.child()?;
        self.orders[slot].add_child(child);
        self.rows += 1;
        Ok(self)
    }

    /// Number of rows folded so far.
    pub fn rows_consumed(&self) -> usize {
        self.rows
    }

    /// Number of distinct orders seen so far.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Ends the fold, applying the row budget for a read capped at `limit`.
    pub fn finish(self, limit: usize) -> Vec<Order> {
        apply_row_budget(self.orders, self.rows, limit)
    }
}

/// Drops the most recently started order when the row cap was reached.
///
/// A read that consumed `limit` rows may have been cut inside the last
/// order's children, so that order is removed whole.
pub fn apply_row_budget(mut orders: Vec<Order>, rows_consumed: usize, limit: usize) -> Vec<Order> {
    if rows_consumed >= limit
        && let Some(dropped) = orders.pop()
    {
        tracing::debug!(
            order_id = ?dropped.id(),
            rows_consumed,
            limit,
            "row limit reached, dropping last order"
        );
        metrics::counter!("pending_orders_truncated_total").increment(1);
    }
    orders
}

/// Folds a complete row sequence read with a cap of `limit` rows.
pub fn aggregate_rows<'r, R, I>(rows: I, limit: usize) -> Result<Vec<Order>>
where
    R: OrderRow + 'r,
    I: IntoIterator<Item = &'r R>,
{
    let aggregation = rows
        .into_iter()
        .try_fold(OrderAggregation::new(), |acc, row| acc.push(row))?;
    Ok(aggregation.finish(limit))
}

/// Attaches separately fetched children to their orders.
///
/// Every order in `orders` must be persisted. A child whose order is not in
/// the batch is reported as a corrupt row.
pub fn attach_children<I>(mut orders: Vec<Order>, children: I) -> Result<Vec<Order>>
where
    I: IntoIterator<Item = (OrderId, Child)>,
{
    let index: HashMap<OrderId, usize> = orders
        .iter()
        .enumerate()
        .filter_map(|(slot, order)| order.id().map(|id| (id, slot)))
        .collect();

    for (order_id, child) in children {
        let slot = index.get(&order_id).copied().ok_or_else(|| {
            StoreError::corrupt(
                "student_order_id",
                format!("child references order {order_id} outside the batch"),
            )
        })?;
        orders[slot].add_child(child);
    }

    Ok(orders)
}
