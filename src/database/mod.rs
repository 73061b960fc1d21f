pub mod manager;
pub mod models;
pub mod patch;
pub mod source;

pub use manager::{DatabaseError, DatabaseManager};
pub use patch::UpdateBuilder;
pub use source::TableSource;

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// Run `work` inside one transaction: commit on `Ok`, roll back on `Err`.
///
/// ```ignore
/// let id = transaction(pool, move |conn| Box::pin(async move {
///     Colors::insert(conn, &name, &code).await
/// }))
/// .await?;
/// ```
pub async fn transaction<T, F>(pool: &PgPool, work: F) -> Result<T, sqlx::Error>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, sqlx::Error>>,
{
    let mut tx = pool.begin().await?;
    match work(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            rollback(tx, &e).await;
            Err(e)
        }
    }
}

async fn rollback(tx: Transaction<'_, Postgres>, cause: &sqlx::Error) {
    tracing::error!("Write failed, rolling back: {}", cause);
    if let Err(e) = tx.rollback().await {
        tracing::warn!("Rollback failed: {}", e);
    }
}
