use sqlx::{PgConnection, Postgres, QueryBuilder};

/// Builds `UPDATE <table> SET ... WHERE id = $n` from the fields a patch
/// actually carries. `None` values are skipped so they stay unchanged.
pub struct UpdateBuilder {
    qb: QueryBuilder<'static, Postgres>,
    fields: usize,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            qb: QueryBuilder::new(format!("UPDATE \"{}\" SET ", table)),
            fields: 0,
        }
    }

    /// Same as `new`, plus `updated_at = NOW()` on every update.
    pub fn with_timestamps(table: &'static str) -> Self {
        let mut builder = Self::new(table);
        builder.qb.push("\"updated_at\" = NOW()");
        builder.fields = 1;
        builder
    }

    pub fn set<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'static + Send + sqlx::Encode<'static, Postgres> + sqlx::Type<Postgres>,
    {
        if let Some(value) = value {
            if self.fields > 0 {
                self.qb.push(", ");
            }
            self.qb.push(format!("\"{}\" = ", column));
            self.qb.push_bind(value);
            self.fields += 1;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    /// Runs the update and returns the number of rows touched (0 when the id
    /// does not exist).
    pub async fn execute(mut self, conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        if self.fields == 0 {
            // Nothing to change; still report whether the row exists
            self.qb.push("\"id\" = \"id\"");
        }
        self.qb.push(" WHERE \"id\" = ");
        self.qb.push_bind(id);
        let result = self.qb.build().execute(conn).await?;
        Ok(result.rows_affected())
    }

    #[cfg(test)]
    fn sql(&self) -> &str {
        self.qb.sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supplied_fields_are_set() {
        let mut update = UpdateBuilder::with_timestamps("colors");
        update.set("name", Some("Crimson".to_string()));
        update.set::<String>("code", None);
        assert_eq!(update.sql(), "UPDATE \"colors\" SET \"updated_at\" = NOW(), \"name\" = $1");
    }

    #[test]
    fn tracks_emptiness() {
        let mut update = UpdateBuilder::new("product_stocks");
        assert!(update.is_empty());
        update.set("qty", Some(4_i64));
        assert!(!update.is_empty());
        assert_eq!(update.sql(), "UPDATE \"product_stocks\" SET \"qty\" = $1");
    }
}
