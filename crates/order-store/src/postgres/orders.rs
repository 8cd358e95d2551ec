use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{Adult, Child, Order, OrderStatus, Person};
use futures_util::TryStreamExt;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use super::PostgresStore;
use super::rows::{decode_child, decode_header, decode_order_id};
use crate::aggregator::{OrderAggregation, attach_children};
use crate::error::storage_failure;
use crate::transaction::with_transaction;
use crate::{FetchStrategy, OrderStore, PendingOrdersQuery, Result, StoreError};

const INSERT_ORDER: &str = r#"
    INSERT INTO student_order (
        student_order_status, student_order_date,
        h_sur_name, h_given_name, h_patronymic, h_date_of_birth,
        h_passport_seria, h_passport_number, h_passport_date, h_passport_office_id,
        h_post_code, h_street_code, h_building, h_extension, h_apartment,
        h_university_id, h_student_number,
        w_sur_name, w_given_name, w_patronymic, w_date_of_birth,
        w_passport_seria, w_passport_number, w_passport_date, w_passport_office_id,
        w_post_code, w_street_code, w_building, w_extension, w_apartment,
        w_university_id, w_student_number,
        certificate_id, register_office_id, marriage_date
    )
    VALUES (
        $1, $2,
        $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
        $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32,
        $33, $34, $35
    )
    RETURNING student_order_id
"#;

const INSERT_CHILDREN: &str = r#"
    INSERT INTO student_child (
        student_order_id, c_sur_name, c_given_name, c_patronymic, c_date_of_birth,
        c_certificate_number, c_certificate_date, c_register_office_id,
        c_post_code, c_street_code, c_building, c_extension, c_apartment
    )
"#;

const SELECT_ORDERS_WITH_CHILDREN: &str = r#"
    SELECT so.*,
        ro.r_office_area_id AS m_office_area_id, ro.r_office_name AS m_office_name,
        po_h.p_office_area_id AS h_p_office_area_id, po_h.p_office_name AS h_p_office_name,
        po_w.p_office_area_id AS w_p_office_area_id, po_w.p_office_name AS w_p_office_name,
        st_h.street_name AS h_street_name, st_w.street_name AS w_street_name,
        un_h.university_name AS h_university_name, un_w.university_name AS w_university_name,
        soc.c_sur_name, soc.c_given_name, soc.c_patronymic, soc.c_date_of_birth,
        soc.c_certificate_number, soc.c_certificate_date, soc.c_register_office_id,
        soc.c_post_code, soc.c_street_code, soc.c_building, soc.c_extension, soc.c_apartment,
        ro_c.r_office_area_id AS c_office_area_id, ro_c.r_office_name AS c_office_name,
        st_c.street_name AS c_street_name
    FROM student_order so
    INNER JOIN register_office ro ON ro.r_office_id = so.register_office_id
    INNER JOIN passport_office po_h ON po_h.p_office_id = so.h_passport_office_id
    INNER JOIN passport_office po_w ON po_w.p_office_id = so.w_passport_office_id
    INNER JOIN street st_h ON st_h.street_code = so.h_street_code
    INNER JOIN street st_w ON st_w.street_code = so.w_street_code
    INNER JOIN university un_h ON un_h.university_id = so.h_university_id
    INNER JOIN university un_w ON un_w.university_id = so.w_university_id
    INNER JOIN student_child soc ON soc.student_order_id = so.student_order_id
    INNER JOIN register_office ro_c ON ro_c.r_office_id = soc.c_register_office_id
    INNER JOIN street st_c ON st_c.street_code = soc.c_street_code
    WHERE so.student_order_status = $1
    ORDER BY so.student_order_id, soc.student_child_id
    LIMIT $2
"#;

const SELECT_ORDER_HEADERS: &str = r#"
    SELECT so.*,
        ro.r_office_area_id AS m_office_area_id, ro.r_office_name AS m_office_name,
        po_h.p_office_area_id AS h_p_office_area_id, po_h.p_office_name AS h_p_office_name,
        po_w.p_office_area_id AS w_p_office_area_id, po_w.p_office_name AS w_p_office_name,
        st_h.street_name AS h_street_name, st_w.street_name AS w_street_name,
        un_h.university_name AS h_university_name, un_w.university_name AS w_university_name
    FROM student_order so
    INNER JOIN register_office ro ON ro.r_office_id = so.register_office_id
    INNER JOIN passport_office po_h ON po_h.p_office_id = so.h_passport_office_id
    INNER JOIN passport_office po_w ON po_w.p_office_id = so.w_passport_office_id
    INNER JOIN street st_h ON st_h.street_code = so.h_street_code
    INNER JOIN street st_w ON st_w.street_code = so.w_street_code
    INNER JOIN university un_h ON un_h.university_id = so.h_university_id
    INNER JOIN university un_w ON un_w.university_id = so.w_university_id
    WHERE so.student_order_status = $1
    ORDER BY so.student_order_date, so.student_order_id
    LIMIT $2
"#;

const SELECT_CHILDREN: &str = r#"
    SELECT soc.*,
        ro_c.r_office_area_id AS c_office_area_id, ro_c.r_office_name AS c_office_name,
        st_c.street_name AS c_street_name
    FROM student_child soc
    INNER JOIN register_office ro_c ON ro_c.r_office_id = soc.c_register_office_id
    INNER JOIN street st_c ON st_c.street_code = soc.c_street_code
    WHERE soc.student_order_id = ANY($1)
    ORDER BY soc.student_child_id
"#;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

fn bind_person<'q>(query: PgQuery<'q>, person: &'q Person) -> PgQuery<'q> {
    query
        .bind(&person.sur_name)
        .bind(&person.given_name)
        .bind(&person.patronymic)
        .bind(person.date_of_birth)
}

fn bind_adult<'q>(query: PgQuery<'q>, adult: &'q Adult) -> PgQuery<'q> {
    let address = &adult.person.address;

    bind_person(query, &adult.person)
        .bind(&adult.passport.seria)
        .bind(&adult.passport.number)
        .bind(adult.passport.issue_date)
        .bind(adult.passport.office.id)
        .bind(&address.post_code)
        .bind(address.street.code)
        .bind(&address.building)
        .bind(address.extension.as_deref())
        .bind(address.apartment.as_deref())
        .bind(adult.university.id)
        .bind(&adult.student_id)
}

/// Inserts the header row with server-controlled status and timestamp.
async fn insert_header(conn: &mut PgConnection, order: &Order) -> Result<OrderId> {
    let query = sqlx::query(INSERT_ORDER)
        .bind(OrderStatus::Start.as_i32())
        .bind(Utc::now());
    let query = bind_adult(query, &order.husband);
    let query = bind_adult(query, &order.wife)
        .bind(&order.marriage.certificate_id)
        .bind(order.marriage.office.id)
        .bind(order.marriage.date);

    let row = query
        .fetch_one(&mut *conn)
        .await
        .map_err(storage_failure("insert_order"))?;

    decode_order_id(&row)
}

/// Inserts the children batch as one multi-row statement.
async fn insert_children(
    conn: &mut PgConnection,
    order_id: OrderId,
    children: &[Child],
) -> Result<()> {
    if children.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(INSERT_CHILDREN);
    builder.push_values(children, |mut row, child| {
        let address = &child.person.address;
        row.push_bind(order_id.as_i64())
            .push_bind(&child.person.sur_name)
            .push_bind(&child.person.given_name)
            .push_bind(&child.person.patronymic)
            .push_bind(child.person.date_of_birth)
            .push_bind(&child.certificate.number)
            .push_bind(child.certificate.issue_date)
            .push_bind(child.certificate.office.id)
            .push_bind(&address.post_code)
            .push_bind(address.street.code)
            .push_bind(&address.building)
            .push_bind(address.extension.as_deref())
            .push_bind(address.apartment.as_deref());
    });

    let result = builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(storage_failure("insert_children"))?;

    let expected = children.len() as u64;
    if result.rows_affected() != expected {
        return Err(StoreError::IncompleteWrite {
            table: "student_child",
            expected,
            actual: result.rows_affected(),
        });
    }

    Ok(())
}

impl PostgresStore {
    async fn fetch_joined(&self, query: &PendingOrdersQuery) -> Result<Vec<Order>> {
        let mut rows = sqlx::query(SELECT_ORDERS_WITH_CHILDREN)
            .bind(query.status.as_i32())
            .bind(query.sql_limit())
            .fetch(&self.pool);

        let mut aggregation = OrderAggregation::new();
        while let Some(row) = rows
            .try_next()
            .await
            .map_err(storage_failure("select_orders"))?
        {
            aggregation = aggregation.push(&row)?;
        }

        tracing::debug!(
            rows = aggregation.rows_consumed(),
            orders = aggregation.order_count(),
            "joined order rows consumed"
        );
        Ok(aggregation.finish(query.limit))
    }

    async fn fetch_headers_then_children(
        &self,
        query: &PendingOrdersQuery,
    ) -> Result<Vec<Order>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(storage_failure("acquire"))?;

        let orders = sqlx::query(SELECT_ORDER_HEADERS)
            .bind(query.status.as_i32())
            .bind(query.sql_limit())
            .fetch_all(&mut *conn)
            .await
            .map_err(storage_failure("select_order_headers"))?
            .iter()
            .map(decode_header)
            .collect::<Result<Vec<_>>>()?;

        if orders.is_empty() {
            return Ok(orders);
        }

        let ids: Vec<i64> = orders
            .iter()
            .filter_map(|order| order.id())
            .map(|id| id.as_i64())
            .collect();

        let children = sqlx::query(SELECT_CHILDREN)
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
            .map_err(storage_failure("select_children"))?
            .iter()
            .map(|row| -> Result<(OrderId, Child)> {
                Ok((decode_order_id(row)?, decode_child(row)?))
            })
            .collect::<Result<Vec<_>>>()?;

        attach_children(orders, children)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[tracing::instrument(skip(self, order), fields(children = order.children.len()))]
    async fn save_order(&self, order: &Order) -> Result<OrderId> {
        let order = order.clone();
        let result = with_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let order_id = insert_header(conn, &order).await?;
                insert_children(conn, order_id, &order.children).await?;
                Ok::<_, StoreError>(order_id)
            })
        })
        .await;

        match &result {
            Ok(order_id) => {
                metrics::counter!("orders_saved_total").increment(1);
                tracing::info!(%order_id, "order saved");
            }
            Err(_) => metrics::counter!("orders_save_failed_total").increment(1),
        }
        result
    }

    #[tracing::instrument(skip(self))]
    async fn query_orders(&self, query: PendingOrdersQuery) -> Result<Vec<Order>> {
        let orders = match query.strategy {
            FetchStrategy::SingleJoin => self.fetch_joined(&query).await?,
            FetchStrategy::HeadersThenChildren => self.fetch_headers_then_children(&query).await?,
        };

        metrics::counter!("pending_orders_loaded_total").increment(orders.len() as u64);
        tracing::info!(count = orders.len(), status = %query.status, "orders loaded");
        Ok(orders)
    }
}
