//! Shared types for the student order registry.

pub mod types;

pub use types::OrderId;
