//! Domain model for the student order registry.
//!
//! This crate provides:
//! - the student order graph (order, husband and wife, children)
//! - the order workflow status
//! - reference directory records (streets, universities, offices, areas)
//! - typed area tree paths and child-area pattern generation

pub mod area;
pub mod directory;
pub mod error;
pub mod order;

pub use area::{AREA_CODE_LEN, AreaCode, AreaCodeError, ChildAreaPattern};
pub use directory::{CountryArea, PassportOffice, RegisterOffice, Street, University};
pub use error::DomainError;
pub use order::{
    Address, Adult, BirthCertificate, Child, Marriage, Order, OrderStatus, Passport, Person,
};
