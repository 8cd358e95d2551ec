use domain::OrderStatus;

/// How an order batch is read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// One query joining every order to its children.
    ///
    /// `limit` caps joined rows, not orders. When the cap is reached the last
    /// order is dropped because its children may be incomplete. Orders without
    /// children never appear.
    #[default]
    SingleJoin,

    /// One query for up to `limit` order headers, then one query for all of
    /// their children. `limit` caps orders and childless orders are returned.
    HeadersThenChildren,
}

/// Builder for reading a batch of orders by status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrdersQuery {
    /// Status to select (default: the initial status).
    pub status: OrderStatus,

    /// Row or order cap, depending on `strategy`.
    pub limit: usize,

    /// Read strategy.
    pub strategy: FetchStrategy,
}

impl PendingOrdersQuery {
    /// Creates a query for pending orders with the default strategy.
    pub fn new(limit: usize) -> Self {
        Self {
            status: OrderStatus::Start,
            limit,
            strategy: FetchStrategy::default(),
        }
    }

    /// Selects orders in another status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Overrides the cap.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Overrides the read strategy.
    pub fn strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Bound value for SQL `LIMIT`.
    pub(crate) fn sql_limit(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }
}
