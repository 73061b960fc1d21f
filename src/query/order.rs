use crate::config::SortPolicy;

use super::error::QueryError;
use super::params::ListQuery;
use super::types::{OrderBy, SortDirection, SortInfo};

pub struct ListOrder;

impl ListOrder {
    /// Resolve the order applied to the store and the sort metadata echoed to
    /// the client.
    ///
    /// Under `Legacy` the store always sees `id ASC` while the metadata repeats
    /// what was asked for. Under `Fixed` an allowed field is honored and
    /// anything else falls back to `id`.
    pub fn resolve(
        policy: SortPolicy,
        query: &ListQuery,
        sortable: &'static [&'static str],
    ) -> (OrderBy, SortInfo) {
        let requested = query.sort_field();
        let direction = query.sort_direction();

        match policy {
            SortPolicy::Legacy => (
                OrderBy::ID_ASC,
                SortInfo {
                    sort_field: requested.to_string(),
                    sort_direction: direction,
                },
            ),
            SortPolicy::Fixed => {
                let column = sortable
                    .iter()
                    .copied()
                    .find(|field| *field == requested)
                    .unwrap_or("id");
                if column != requested {
                    tracing::debug!("Sort field '{}' not sortable, using id", requested);
                }
                (
                    OrderBy { column, direction },
                    SortInfo {
                        sort_field: column.to_string(),
                        sort_direction: direction,
                    },
                )
            }
        }
    }

    /// `ORDER BY "col" DIR`, with `id` as a tie-breaker so pages are stable.
    pub fn generate(order: &OrderBy) -> Result<String, QueryError> {
        Self::validate_column(order.column)?;
        if order.column == "id" {
            return Ok(format!("ORDER BY \"id\" {}", order.direction.to_sql()));
        }
        Ok(format!(
            "ORDER BY \"{}\" {}, \"id\" {}",
            order.column,
            order.direction.to_sql(),
            SortDirection::Asc.to_sql()
        ))
    }

    fn validate_column(column: &str) -> Result<(), QueryError> {
        let mut chars = column.chars();
        let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(QueryError::InvalidColumn(column.to_string()));
        }
        Ok(())
    }
}
