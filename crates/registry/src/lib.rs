//! Student order registry.
//!
//! Wraps a directory and order store behind one facade that carries the
//! configured default batch size, with structured logging (tracing).

pub mod config;
pub mod error;
pub mod service;

pub use config::Config;
pub use error::RegistryError;
pub use service::StudentOrderRegistry;
