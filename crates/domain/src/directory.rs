//! Reference directories: streets, universities, offices and areas.
//!
//! These records are owned by the directory tables and only looked up by id.

use serde::{Deserialize, Serialize};

use crate::area::AreaCode;

/// A street from the street directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Street {
    pub code: i64,
    pub name: String,
}

impl Street {
    pub fn new(code: i64, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// A university referenced by student adults.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct University {
    pub id: i64,
    pub name: String,
}

impl University {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// An office issuing passports, located in one area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassportOffice {
    pub id: i64,
    pub area_id: AreaCode,
    pub name: String,
}

impl PassportOffice {
    pub fn new(id: i64, area_id: AreaCode, name: impl Into<String>) -> Self {
        Self {
            id,
            area_id,
            name: name.into(),
        }
    }
}

/// A civil-registry office. Registers marriages and issues birth certificates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterOffice {
    pub id: i64,
    pub area_id: AreaCode,
    pub name: String,
}

impl RegisterOffice {
    pub fn new(id: i64, area_id: AreaCode, name: impl Into<String>) -> Self {
        Self {
            id,
            area_id,
            name: name.into(),
        }
    }
}

/// A node of the administrative area tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryArea {
    pub area_id: AreaCode,
    pub name: String,
}

impl CountryArea {
    pub fn new(area_id: AreaCode, name: impl Into<String>) -> Self {
        Self {
            area_id,
            name: name.into(),
        }
    }
}
