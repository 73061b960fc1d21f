use serde::Deserialize;

use super::types::SortDirection;

/// Raw collection query string: `?sort=&order=&limit=&offset=&page=`.
///
/// Everything is taken as text so a malformed number never rejects the
/// request; it is simply treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    /// Requested sort field, `id` when missing or blank.
    pub fn sort_field(&self) -> &str {
        match self.sort.as_deref().map(str::trim) {
            Some(field) if !field.is_empty() => field,
            _ => "id",
        }
    }

    pub fn sort_direction(&self) -> SortDirection {
        SortDirection::parse(self.order.as_deref())
    }

    pub fn limit(&self) -> Option<i64> {
        positive(self.limit.as_deref())
    }

    pub fn offset(&self) -> Option<i64> {
        positive(self.offset.as_deref())
    }

    /// 1-based page for paginated mode.
    pub fn page(&self) -> i64 {
        positive(self.page.as_deref()).unwrap_or(1)
    }
}

/// Zero, negatives and non-numbers are falsy and count as absent.
fn positive(value: Option<&str>) -> Option<i64> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
}
