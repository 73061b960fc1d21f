use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};

use crate::query::order::ListOrder;
use crate::query::{OrderBy, QueryError, RecordSource, Window};

/// `RecordSource` over one entity's base `SELECT`.
///
/// The base statement is wrapped as a sub-select so that ordering can use the
/// projected column names (including subquery display names) directly.
pub struct TableSource<'a, T> {
    pool: &'a PgPool,
    select_sql: &'static str,
    scope: Option<(&'static str, i64)>,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<'a, T> TableSource<'a, T> {
    pub fn new(pool: &'a PgPool, select_sql: &'static str) -> Self {
        Self {
            pool,
            select_sql,
            scope: None,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Restrict to rows whose `column` equals `value`
    pub fn scoped(mut self, column: &'static str, value: i64) -> Self {
        self.scope = Some((column, value));
        self
    }

    fn base(&self, projection: &str) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM (", projection));
        qb.push(self.select_sql);
        qb.push(") AS listing");
        if let Some((column, value)) = self.scope {
            qb.push(format!(" WHERE listing.\"{}\" = ", column));
            qb.push_bind(value);
        }
        qb
    }
}

#[async_trait]
impl<'a, T> RecordSource for TableSource<'a, T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    type Record = T;

    async fn count(&self) -> Result<i64, QueryError> {
        let mut qb = self.base("COUNT(*)");
        let count: i64 = qb.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count)
    }

    async fn fetch(&self, order: &OrderBy, window: Window) -> Result<Vec<T>, QueryError> {
        let mut qb = self.base("*");
        qb.push(" ");
        qb.push(ListOrder::generate(order)?);
        if let Some(limit) = window.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
        if let Some(offset) = window.offset {
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }

        tracing::debug!("List query: {}", qb.sql());
        let rows = qb.build_query_as::<T>().fetch_all(self.pool).await?;
        Ok(rows)
    }
}
