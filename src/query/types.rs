use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than a case-insensitive `desc` sorts ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort applied to the store. The column always comes from an endpoint's
/// static allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl OrderBy {
    pub const ID_ASC: OrderBy = OrderBy {
        column: "id",
        direction: SortDirection::Asc,
    };
}

/// Row window handed to the store. `None` means the store default
/// (no LIMIT, OFFSET 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortInfo {
    #[serde(rename = "sortField")]
    pub sort_field: String,
    #[serde(rename = "sortDirection")]
    pub sort_direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paging {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    #[serde(rename = "lastPage")]
    pub last_page: i64,
}

impl Paging {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let last_page = if limit > 0 {
            ((total + limit - 1) / limit).max(1)
        } else {
            1
        };
        Self {
            total,
            page,
            limit,
            last_page,
        }
    }
}

/// `data` of a collection response.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage<T> {
    pub sort: SortInfo,
    #[serde(rename = "fieldsAvailableSortBy")]
    pub fields_available_sort_by: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
    #[serde(rename = "Items")]
    pub items: Vec<T>,
}
