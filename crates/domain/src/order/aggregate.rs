//! The student order graph.

use chrono::{DateTime, NaiveDate, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::directory::RegisterOffice;

use super::{Adult, Child, OrderStatus};

/// Marriage registration data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marriage {
    pub certificate_id: String,
    pub date: NaiveDate,
    pub office: RegisterOffice,
}

impl Marriage {
    pub fn new(certificate_id: impl Into<String>, date: NaiveDate, office: RegisterOffice) -> Self {
        Self {
            certificate_id: certificate_id.into(),
            date,
            office,
        }
    }
}

/// A student marriage order with its husband, wife and children.
///
/// The identifier and creation timestamp are assigned by the store when the
/// order is written. An order built with [`Order::new`] carries neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Option<OrderId>,
    created_at: Option<DateTime<Utc>>,
    status: OrderStatus,
    pub husband: Adult,
    pub wife: Adult,
    pub marriage: Marriage,
    pub children: Vec<Child>,
}

impl Order {
    /// Creates an unsaved order with no children.
    pub fn new(husband: Adult, wife: Adult, marriage: Marriage) -> Self {
        Self {
            id: None,
            created_at: None,
            status: OrderStatus::Start,
            husband,
            wife,
            marriage,
            children: Vec::new(),
        }
    }

    /// Rebuilds a persisted order header. Children are added separately.
    pub fn restore(
        id: OrderId,
        created_at: DateTime<Utc>,
        status: OrderStatus,
        husband: Adult,
        wife: Adult,
        marriage: Marriage,
    ) -> Self {
        Self {
            id: Some(id),
            created_at: Some(created_at),
            status,
            husband,
            wife,
            marriage,
            children: Vec::new(),
        }
    }

    /// Store-assigned identifier, if the order has been persisted.
    pub fn id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn add_child(&mut self, child: Child) {
        self.children.push(child);
    }

    /// Builder-style variant of [`Order::add_child`].
    pub fn with_child(mut self, child: Child) -> Self {
        self.children.push(child);
        self
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}
