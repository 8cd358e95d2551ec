pub mod aggregator;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;
pub mod transaction;

pub use aggregator::{OrderAggregation, OrderRow, aggregate_rows, apply_row_budget, attach_children};
pub use common::OrderId;
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{FetchStrategy, PendingOrdersQuery};
pub use store::{DirectoryStore, OrderStore, OrderStoreExt};
pub use transaction::with_transaction;
