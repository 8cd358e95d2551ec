//! Scoped transactions.

use futures_util::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

use crate::Result;
use crate::error::storage_failure;

/// Runs `work` inside one database transaction.
///
/// The transaction commits when `work` returns `Ok` and rolls back when it
/// returns `Err`; the error is then returned unchanged. The pooled connection
/// is released on every path.
///
/// ```ignore
/// let id = with_transaction(&pool, move |conn| {
///     Box::pin(async move {
///         let id = insert_header(conn, &order).await?;
///         insert_children(conn, id, &order.children).await?;
///         Ok(id)
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<T, F>(pool: &PgPool, work: F) -> Result<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T>> + Send,
{
    let mut tx = pool.begin().await.map_err(storage_failure("begin"))?;

    match work(&mut *tx).await {
        Ok(value) => {
            tx.commit().await.map_err(storage_failure("commit"))?;
            Ok(value)
        }
        Err(err) => {
            match tx.rollback().await {
                Ok(()) => tracing::warn!(error = %err, "transaction rolled back"),
                Err(rollback_err) => {
                    tracing::error!(error = %err, %rollback_err, "rollback failed")
                }
            }
            Err(err)
        }
    }
}
