//! Decoding of joined order rows.
//!
//! Header columns come from `student_order` plus the aliased directory joins
//! (`m_office_*` for the marriage office, `{h,w}_p_office_*` for passport
//! offices, `{h,w}_street_name`, `{h,w}_university_name`). Child columns use
//! the `c_` prefix, with `c_office_*` for the issuing register office.

use common::OrderId;
use domain::{
    Address, Adult, AreaCode, BirthCertificate, Child, Marriage, Order, OrderStatus, Passport,
    PassportOffice, Person, RegisterOffice, Street, University,
};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::aggregator::OrderRow;
use crate::{Result, StoreError};

impl OrderRow for PgRow {
    fn order_id(&self) -> Result<OrderId> {
        decode_order_id(self)
    }

    fn header(&self) -> Result<Order> {
        decode_header(self)
    }

    fn child(&self) -> Result<Child> {
        decode_child(self)
    }
}

pub(super) fn decode_order_id(row: &PgRow) -> Result<OrderId> {
    Ok(OrderId::new(row.try_get("student_order_id")?))
}

pub(super) fn decode_header(row: &PgRow) -> Result<Order> {
    let raw_status: i32 = row.try_get("student_order_status")?;
    let status = OrderStatus::from_i32(raw_status)
        .map_err(|e| StoreError::corrupt("student_order_status", e))?;

    let marriage = Marriage::new(
        row.try_get::<String, _>("certificate_id")?,
        row.try_get("marriage_date")?,
        RegisterOffice::new(
            row.try_get("register_office_id")?,
            area_code(row, "m_office_area_id")?,
            row.try_get::<String, _>("m_office_name")?,
        ),
    );

    Ok(Order::restore(
        decode_order_id(row)?,
        row.try_get("student_order_date")?,
        status,
        decode_adult(row, "h_")?,
        decode_adult(row, "w_")?,
        marriage,
    ))
}

pub(super) fn decode_child(row: &PgRow) -> Result<Child> {
    let certificate = BirthCertificate {
        number: row.try_get("c_certificate_number")?,
        issue_date: row.try_get("c_certificate_date")?,
        office: RegisterOffice::new(
            row.try_get("c_register_office_id")?,
            area_code(row, "c_office_area_id")?,
            row.try_get::<String, _>("c_office_name")?,
        ),
    };

    Ok(Child::new(decode_person(row, "c_")?, certificate))
}

fn decode_adult(row: &PgRow, prefix: &str) -> Result<Adult> {
    let column = |name: &str| format!("{prefix}{name}");

    let passport = Passport {
        seria: row.try_get(column("passport_seria").as_str())?,
        number: row.try_get(column("passport_number").as_str())?,
        issue_date: row.try_get(column("passport_date").as_str())?,
        office: PassportOffice::new(
            row.try_get(column("passport_office_id").as_str())?,
            area_code(row, &column("p_office_area_id"))?,
            row.try_get::<String, _>(column("p_office_name").as_str())?,
        ),
    };

    let university = University::new(
        row.try_get(column("university_id").as_str())?,
        row.try_get::<String, _>(column("university_name").as_str())?,
    );

    Ok(Adult::new(
        decode_person(row, prefix)?,
        passport,
        university,
        row.try_get::<String, _>(column("student_number").as_str())?,
    ))
}

fn decode_person(row: &PgRow, prefix: &str) -> Result<Person> {
    let column = |name: &str| format!("{prefix}{name}");

    let address = Address {
        post_code: row.try_get(column("post_code").as_str())?,
        street: Street::new(
            row.try_get(column("street_code").as_str())?,
            row.try_get::<String, _>(column("street_name").as_str())?,
        ),
        building: row.try_get(column("building").as_str())?,
        extension: row.try_get(column("extension").as_str())?,
        apartment: row.try_get(column("apartment").as_str())?,
    };

    Ok(Person::new(
        row.try_get::<String, _>(column("sur_name").as_str())?,
        row.try_get::<String, _>(column("given_name").as_str())?,
        row.try_get::<String, _>(column("patronymic").as_str())?,
        row.try_get(column("date_of_birth").as_str())?,
        address,
    ))
}

pub(super) fn area_code(row: &PgRow, column: &str) -> Result<AreaCode> {
    let raw: String = row.try_get(column)?;
    AreaCode::parse(&raw).map_err(|e| StoreError::corrupt(column, e))
}
