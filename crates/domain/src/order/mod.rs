//! Student order and the values it owns.

mod aggregate;
mod state;
mod value_objects;

pub use aggregate::{Marriage, Order};
pub use state::OrderStatus;
pub use value_objects::{Address, Adult, BirthCertificate, Child, Passport, Person};
