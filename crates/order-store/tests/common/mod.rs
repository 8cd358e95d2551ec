//! Order fixtures matching `fixtures/directory.sql`.

#![allow(dead_code)]

use chrono::NaiveDate;
use domain::{
    Address, Adult, AreaCode, BirthCertificate, Child, CountryArea, Marriage, Order,
    Passport, PassportOffice, Person, RegisterOffice, Street, University,
};
use order_store::InMemoryStore;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn area(code: &str) -> AreaCode {
    AreaCode::parse(code).unwrap()
}

pub fn street(code: i64) -> Street {
    let name = match code {
        1 => "Sadovaya",
        2 => "Nevsky Prospekt",
        3 => "Gorokhovaya",
        4 => "Vladimirsky Prospekt",
        _ => "Unknown",
    };
    Street::new(code, name)
}

pub fn university() -> University {
    University::new(1, "State University")
}

pub fn passport_office() -> PassportOffice {
    PassportOffice::new(1, area("010020000000"), "Passport office 1")
}

pub fn register_office() -> RegisterOffice {
    RegisterOffice::new(1, area("010010000000"), "Registry office 1")
}

pub fn address(street_code: i64) -> Address {
    Address::new("195000", street(street_code), "12")
        .with_extension("B")
        .with_apartment("42")
}

pub fn adult(sur_name: &str, given_name: &str, passport_number: &str) -> Adult {
    Adult::new(
        Person::new(sur_name, given_name, "Ivanovich", date(1998, 3, 14), address(1)),
        Passport {
            seria: "4010".to_string(),
            number: passport_number.to_string(),
            issue_date: date(2018, 4, 1),
            office: passport_office(),
        },
        university(),
        format!("ST-{passport_number}"),
    )
}

pub fn child(given_name: &str, certificate_number: &str) -> Child {
    let address = Address::new("195000", street(2), "7");
    Child::new(
        Person::new("Petrov", given_name, "Pavlovich", date(2019, 9, 1), address),
        BirthCertificate {
            number: certificate_number.to_string(),
            issue_date: date(2019, 9, 10),
            office: register_office(),
        },
    )
}

/// Builds an unsaved order with one child per name.
pub fn order_with_children(names: &[&str]) -> Order {
    let mut order = Order::new(
        adult("Petrov", "Pavel", "100001"),
        adult("Petrova", "Anna", "100002"),
        Marriage::new("MC-0001", date(2018, 6, 20), register_office()),
    );
    for (n, name) in names.iter().enumerate() {
        order.add_child(child(name, &format!("BC-{n:04}")));
    }
    order
}

/// Seeds an in-memory store with the same directories as the SQL fixture.
pub async fn seeded_memory_store() -> InMemoryStore {
    let store = InMemoryStore::new();

    for (code, name) in [
        ("010000000000", "Country 1"),
        ("020000000000", "Country 2"),
        ("010010000000", "Region 1-1"),
        ("010020000000", "Region 1-2"),
        ("020010000000", "Region 2-1"),
        ("020020000000", "Region 2-2"),
        ("020010010000", "District 2-1-1"),
        ("020010020000", "District 2-1-2"),
        ("020010010001", "Locality 2-1-1-1"),
        ("020010010002", "Locality 2-1-1-2"),
        ("000010000000", "Region 0-1"),
        ("020000010000", "District 2-0-1"),
    ] {
        store.add_area(CountryArea::new(area(code), name)).await;
    }
    for code in 1..=4 {
        store.add_street(street(code)).await;
    }
    store.add_passport_office(passport_office()).await;
    store
        .add_passport_office(PassportOffice::new(2, area("010020000000"), "Passport office 2"))
        .await;
    store
        .add_passport_office(PassportOffice::new(3, area("020010010001"), "Passport office 3"))
        .await;
    store
        .add_passport_office(PassportOffice::new(4, area("020000010000"), "Passport office 4"))
        .await;
    store.add_register_office(register_office()).await;
    store
        .add_register_office(RegisterOffice::new(2, area("010010000000"), "Registry office 2"))
        .await;
    store
        .add_register_office(RegisterOffice::new(3, area("020010010002"), "Registry office 3"))
        .await;

    store
}

/// Asserts that a stored order carries the same content as the one saved.
pub fn assert_same_content(stored: &Order, saved: &Order) {
    assert_eq!(stored.husband, saved.husband);
    assert_eq!(stored.wife, saved.wife);
    assert_eq!(stored.marriage, saved.marriage);
    assert_eq!(stored.children, saved.children);
}
