//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration
//! ```

mod common;

use std::sync::Arc;

use common::{assert_same_content, child, order_with_children, register_office};
use domain::{AreaCode, OrderStatus, RegisterOffice};
use order_store::{
    DirectoryStore, FetchStrategy, OrderId, OrderStore, OrderStoreExt, PendingOrdersQuery,
    PostgresStore, StoreError,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            PostgresStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();

            // Directories are read-only, seed them once
            sqlx::raw_sql(include_str!("fixtures/directory.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared order tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE student_child, student_order RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

async fn count(store: &PostgresStore, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .unwrap()
}

async fn mark_checked(store: &PostgresStore, order_id: OrderId) {
    sqlx::query("UPDATE student_order SET student_order_status = $1 WHERE student_order_id = $2")
        .bind(OrderStatus::Checked.as_i32())
        .bind(order_id.as_i64())
        .execute(store.pool())
        .await
        .unwrap();
}

fn names(areas: &[domain::CountryArea]) -> Vec<&str> {
    areas.iter().map(|area| area.name.as_str()).collect()
}

#[tokio::test]
#[serial]
async fn child_areas_walk_the_tree() {
    let store = get_test_store().await;

    let countries = store.find_child_areas("").await.unwrap();
    assert_eq!(names(&countries), ["Country 1", "Country 2"]);

    let regions = store.find_child_areas("020000000000").await.unwrap();
    assert_eq!(names(&regions), ["Region 2-1", "Region 2-2"]);

    let districts = store.find_child_areas("020010000000").await.unwrap();
    assert_eq!(names(&districts), ["District 2-1-1", "District 2-1-2"]);

    let localities = store.find_child_areas("020010010000").await.unwrap();
    assert_eq!(names(&localities), ["Locality 2-1-1-1", "Locality 2-1-1-2"]);
    assert_eq!(
        localities[0].area_id,
        AreaCode::parse("020010010001").unwrap()
    );
}

#[tokio::test]
#[serial]
async fn all_zero_code_is_a_country_not_the_root() {
    let store = get_test_store().await;

    let countries = store.find_child_areas("  ").await.unwrap();
    assert_eq!(names(&countries), ["Country 1", "Country 2"]);

    let regions = store.find_child_areas("000000000000").await.unwrap();
    assert_eq!(names(&regions), ["Region 0-1"]);
    assert_eq!(regions[0].area_id.to_string(), "000010000000");
}

#[tokio::test]
#[serial]
async fn zero_segments_inside_stored_codes_read_back() {
    let store = get_test_store().await;

    let offices = store.find_passport_offices("020000010000").await.unwrap();
    assert_eq!(offices.len(), 1);
    assert_eq!(offices[0].area_id.to_string(), "020000010000");
    assert_eq!(offices[0].name, "Passport office 4");

    // district 001 under region 000 lists no localities but is a valid parent
    assert!(store.find_child_areas("020000010000").await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn child_areas_reject_leaf_and_malformed_codes() {
    let store = get_test_store().await;

    for bad in ["020010010001", "12345", "0200100100ab"] {
        let err = store.find_child_areas(bad).await.unwrap_err();
        assert!(
            matches!(err, StoreError::InvalidArgument(_)),
            "{bad} gave {err:?}"
        );
    }
}

#[tokio::test]
#[serial]
async fn childless_area_yields_empty_list() {
    let store = get_test_store().await;

    let children = store.find_child_areas("010010000000").await.unwrap();
    assert!(children.is_empty());
}

#[tokio::test]
#[serial]
async fn streets_match_substring_ignoring_case() {
    let store = get_test_store().await;

    let streets = store.find_streets("prosp").await.unwrap();
    let codes: Vec<i64> = streets.iter().map(|street| street.code).collect();
    assert_eq!(codes, [2, 4]);

    assert_eq!(store.find_streets("").await.unwrap().len(), 4);
    assert!(store.find_streets("boulevard").await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn offices_match_exact_area() {
    let store = get_test_store().await;

    let passport = store.find_passport_offices("010020000000").await.unwrap();
    assert_eq!(passport.len(), 2);
    assert!(passport.iter().all(|o| o.area_id.to_string() == "010020000000"));

    let register = store.find_register_offices("010010000000").await.unwrap();
    assert_eq!(register.len(), 2);
    assert_eq!(register[0], register_office());

    // Ancestors do not match their descendants' offices
    assert!(store.find_register_offices("010000000000").await.unwrap().is_empty());
    assert!(store.find_passport_offices("").await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn save_and_read_round_trip() {
    let store = get_test_store().await;
    let order = order_with_children(&["Ivan", "Olga"]);

    let order_id = store.save_order(&order).await.unwrap();

    let orders = store.list_pending_orders(10).await.unwrap();
    assert_eq!(orders.len(), 1);

    let stored = &orders[0];
    assert_eq!(stored.id(), Some(order_id));
    assert_eq!(stored.status(), OrderStatus::Start);
    assert!(stored.created_at().is_some());
    assert_same_content(stored, &order);
}

#[tokio::test]
#[serial]
async fn save_ignores_caller_status() {
    let store = get_test_store().await;
    let order = order_with_children(&["Ivan"]);
    let restored = domain::Order::restore(
        OrderId::new(500),
        chrono::Utc::now(),
        OrderStatus::Checked,
        order.husband.clone(),
        order.wife.clone(),
        order.marriage.clone(),
    )
    .with_child(child("Ivan", "BC-0000"));

    let order_id = store.save_order(&restored).await.unwrap();

    assert_ne!(order_id, OrderId::new(500));
    let orders = store.list_pending_orders(10).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status(), OrderStatus::Start);
}

#[tokio::test]
#[serial]
async fn saved_ids_increase() {
    let store = get_test_store().await;

    let first = store.save_order(&order_with_children(&["a"])).await.unwrap();
    let second = store.save_order(&order_with_children(&["b"])).await.unwrap();

    assert!(second > first);
}

#[tokio::test]
#[serial]
async fn failed_child_insert_rolls_back_header() {
    let store = get_test_store().await;

    let mut order = order_with_children(&["Ivan"]);
    let mut orphan = child("Olga", "BC-9999");
    orphan.certificate.office = RegisterOffice::new(
        999,
        AreaCode::parse("010010000000").unwrap(),
        "Missing office",
    );
    order.add_child(orphan);

    let err = store.save_order(&order).await.unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));
    assert!(err.is_storage_failure());

    assert_eq!(count(&store, "student_order").await, 0);
    assert_eq!(count(&store, "student_child").await, 0);
}

#[tokio::test]
#[serial]
async fn empty_store_reads_empty_batch() {
    let store = get_test_store().await;

    assert!(store.list_pending_orders(10).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn row_limit_drops_possibly_incomplete_order() {
    let store = get_test_store().await;
    let first = store
        .save_order(&order_with_children(&["a", "b"]))
        .await
        .unwrap();
    store
        .save_order(&order_with_children(&["c", "d"]))
        .await
        .unwrap();

    // Cut inside the second order
    let orders = store.list_pending_orders(3).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id(), Some(first));
    assert_eq!(orders[0].child_count(), 2);

    // Exactly at the limit the last order is still dropped
    let orders = store.list_pending_orders(4).await.unwrap();
    assert_eq!(orders.len(), 1);

    let orders = store.list_pending_orders(5).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|order| order.child_count() == 2));
}

#[tokio::test]
#[serial]
async fn children_keep_insertion_order() {
    let store = get_test_store().await;
    let order = order_with_children(&["first", "second", "third"]);
    store.save_order(&order).await.unwrap();

    let orders = store.list_pending_orders(10).await.unwrap();
    let given: Vec<&str> = orders[0]
        .children
        .iter()
        .map(|child| child.person.given_name.as_str())
        .collect();
    assert_eq!(given, ["first", "second", "third"]);
}

#[tokio::test]
#[serial]
async fn large_children_batch_is_written_whole() {
    let store = get_test_store().await;
    let names: Vec<String> = (0..40).map(|n| format!("child-{n:02}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let order = order_with_children(&name_refs);

    let order_id = store.save_order(&order).await.unwrap();

    let stored: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM student_child WHERE student_order_id = $1")
            .bind(order_id.as_i64())
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(stored, 40);

    let orders = store.list_pending_orders(100).await.unwrap();
    assert_same_content(&orders[0], &order);
}

#[tokio::test]
#[serial]
async fn single_join_omits_childless_orders() {
    let store = get_test_store().await;
    store.save_order(&order_with_children(&[])).await.unwrap();
    let with_child = store.save_order(&order_with_children(&["a"])).await.unwrap();

    let orders = store.list_pending_orders(10).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id(), Some(with_child));
}

#[tokio::test]
#[serial]
async fn headers_then_children_returns_childless_orders() {
    let store = get_test_store().await;
    let childless = order_with_children(&[]);
    let childless_id = store.save_order(&childless).await.unwrap();
    let family = order_with_children(&["a", "b", "c"]);
    let family_id = store.save_order(&family).await.unwrap();
    store.save_order(&order_with_children(&["d"])).await.unwrap();

    let query = PendingOrdersQuery::new(2).strategy(FetchStrategy::HeadersThenChildren);
    let orders = store.query_orders(query).await.unwrap();

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id(), Some(childless_id));
    assert_same_content(&orders[0], &childless);
    assert_eq!(orders[1].id(), Some(family_id));
    assert_same_content(&orders[1], &family);
}

#[tokio::test]
#[serial]
async fn status_filter_selects_matching_orders() {
    let store = get_test_store().await;
    let checked = store.save_order(&order_with_children(&["a"])).await.unwrap();
    let pending = store.save_order(&order_with_children(&["b"])).await.unwrap();
    mark_checked(&store, checked).await;

    let orders = store.list_pending_orders(10).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id(), Some(pending));

    let query = PendingOrdersQuery::new(10).status(OrderStatus::Checked);
    let orders = store.query_orders(query).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id(), Some(checked));
    assert_eq!(orders[0].status(), OrderStatus::Checked);
}

#[tokio::test]
#[serial]
async fn concurrent_saves_are_all_persisted() {
    let store = get_test_store().await;

    let mut handles = Vec::new();
    for n in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let name = format!("child-{n}");
            store
                .save_order(&order_with_children(&[name.as_str()]))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(count(&store, "student_order").await, 8);
    assert_eq!(count(&store, "student_child").await, 8);
}
