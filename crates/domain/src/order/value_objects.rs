//! Value objects owned by a student order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::directory::{PassportOffice, RegisterOffice, Street, University};

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub post_code: String,
    pub street: Street,
    pub building: String,
    pub extension: Option<String>,
    pub apartment: Option<String>,
}

impl Address {
    /// Creates an address without extension or apartment.
    pub fn new(post_code: impl Into<String>, street: Street, building: impl Into<String>) -> Self {
        Self {
            post_code: post_code.into(),
            street,
            building: building.into(),
            extension: None,
            apartment: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_apartment(mut self, apartment: impl Into<String>) -> Self {
        self.apartment = Some(apartment.into());
        self
    }
}

/// Fields shared by every person in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub sur_name: String,
    pub given_name: String,
    pub patronymic: String,
    pub date_of_birth: NaiveDate,
    pub address: Address,
}

impl Person {
    pub fn new(
        sur_name: impl Into<String>,
        given_name: impl Into<String>,
        patronymic: impl Into<String>,
        date_of_birth: NaiveDate,
        address: Address,
    ) -> Self {
        Self {
            sur_name: sur_name.into(),
            given_name: given_name.into(),
            patronymic: patronymic.into(),
            date_of_birth,
            address,
        }
    }
}

/// Passport of an adult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passport {
    pub seria: String,
    pub number: String,
    pub issue_date: NaiveDate,
    pub office: PassportOffice,
}

/// Birth certificate of a child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthCertificate {
    pub number: String,
    pub issue_date: NaiveDate,
    pub office: RegisterOffice,
}

/// A student spouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adult {
    pub person: Person,
    pub passport: Passport,
    pub university: University,
    pub student_id: String,
}

impl Adult {
    pub fn new(
        person: Person,
        passport: Passport,
        university: University,
        student_id: impl Into<String>,
    ) -> Self {
        Self {
            person,
            passport,
            university,
            student_id: student_id.into(),
        }
    }
}

/// A child of the married couple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub person: Person,
    pub certificate: BirthCertificate,
}

impl Child {
    pub fn new(person: Person, certificate: BirthCertificate) -> Self {
        Self {
            person,
            certificate,
        }
    }
}
