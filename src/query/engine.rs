use async_trait::async_trait;

use crate::config::{ListingConfig, SortPolicy};

use super::error::QueryError;
use super::order::ListOrder;
use super::params::ListQuery;
use super::types::{ListPage, OrderBy, Paging, Window};

/// Anything a collection endpoint can list from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    type Record: Send;

    /// Total rows the source would return without a window.
    async fn count(&self) -> Result<i64, QueryError>;

    async fn fetch(&self, order: &OrderBy, window: Window) -> Result<Vec<Self::Record>, QueryError>;
}

/// Shared sort/pagination contract for every collection endpoint.
///
/// With `limit` or `offset` in the query the result is a flat window and the
/// response has no `paging`. With neither, one page of `page_size` records
/// is returned along with `paging`.
#[derive(Debug, Clone)]
pub struct ListQueryEngine {
    page_size: i64,
    sort_policy: SortPolicy,
}

impl ListQueryEngine {
    pub fn new(config: &ListingConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            sort_policy: config.sort_policy,
        }
    }

    pub async fn list<S, V, F>(
        &self,
        source: &S,
        query: &ListQuery,
        sortable: &'static [&'static str],
        map: F,
    ) -> Result<ListPage<V>, QueryError>
    where
        S: RecordSource + ?Sized,
        F: FnMut(S::Record) -> V,
    {
        let (order, sort) = ListOrder::resolve(self.sort_policy, query, sortable);

        let (window, page) = match (query.limit(), query.offset()) {
            (None, None) => {
                let page = query.page();
                let offset = (page - 1).saturating_mul(self.page_size);
                (
                    Window {
                        limit: Some(self.page_size),
                        offset: Some(offset),
                    },
                    Some(page),
                )
            }
            (limit, offset) => (Window { limit, offset }, None),
        };

        let records = source.fetch(&order, window).await?;

        let paging = match page {
            Some(page) => Some(Paging::new(source.count().await?, page, self.page_size)),
            None => None,
        };

        Ok(ListPage {
            sort,
            fields_available_sort_by: sortable,
            paging,
            items: records.into_iter().map(map).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::SortDirection;

    #[derive(Debug, Clone)]
    struct Row {
        id: i64,
        name: String,
    }

    struct MemorySource {
        rows: Vec<Row>,
    }

    impl MemorySource {
        fn with(names: &[&str]) -> Self {
            Self {
                rows: names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| Row {
                        id: i as i64 + 1,
                        name: n.to_string(),
                    })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl RecordSource for MemorySource {
        type Record = Row;

        async fn count(&self) -> Result<i64, QueryError> {
            Ok(self.rows.len() as i64)
        }

        async fn fetch(&self, order: &OrderBy, window: Window) -> Result<Vec<Row>, QueryError> {
            let mut rows = self.rows.clone();
            match order.column {
                "id" => rows.sort_by_key(|r| r.id),
                "name" => rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
                other => return Err(QueryError::InvalidColumn(other.to_string())),
            }
            if order.direction == SortDirection::Desc {
                rows.reverse();
            }
            let offset = window.offset.unwrap_or(0) as usize;
            let rows = rows.into_iter().skip(offset);
            Ok(match window.limit {
                Some(limit) => rows.take(limit as usize).collect(),
                None => rows.collect(),
            })
        }
    }

    const SORTABLE: &[&str] = &["id", "name"];

    fn engine(policy: SortPolicy) -> ListQueryEngine {
        ListQueryEngine::new(&ListingConfig {
            page_size: 10,
            sort_policy: policy,
        })
    }

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let mut q = ListQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "sort" => q.sort = v,
                "order" => q.order = v,
                "limit" => q.limit = v,
                "offset" => q.offset = v,
                "page" => q.page = v,
                _ => unreachable!(),
            }
        }
        q
    }

    fn names(n: usize) -> Vec<String> {
        // zebra-ish names so name order differs from id order
        (0..n).map(|i| format!("item-{:02}", (i * 7) % n)).collect()
    }

    fn source(n: usize) -> MemorySource {
        let owned = names(n);
        let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
        MemorySource::with(&refs)
    }

    #[tokio::test]
    async fn no_window_params_paginates_by_ten() {
        let page = engine(SortPolicy::Fixed)
            .list(&source(23), &ListQuery::default(), SORTABLE, |r| r.id)
            .await
            .unwrap();
        assert_eq!(page.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(
            page.paging,
            Some(Paging {
                total: 23,
                page: 1,
                limit: 10,
                last_page: 3
            })
        );
    }

    #[tokio::test]
    async fn page_param_selects_later_page() {
        let page = engine(SortPolicy::Fixed)
            .list(&source(23), &query(&[("page", "3")]), SORTABLE, |r| r.id)
            .await
            .unwrap();
        assert_eq!(page.items, vec![21, 22, 23]);
        assert_eq!(page.paging.map(|p| p.page), Some(3));
    }

    #[tokio::test]
    async fn limit_and_offset_give_flat_window_without_paging() {
        let page = engine(SortPolicy::Fixed)
            .list(&source(23), &query(&[("limit", "4"), ("offset", "2")]), SORTABLE, |r| r.id)
            .await
            .unwrap();
        assert_eq!(page.items, vec![3, 4, 5, 6]);
        assert!(page.paging.is_none());
    }

    #[tokio::test]
    async fn limit_alone_is_flat() {
        let page = engine(SortPolicy::Fixed)
            .list(&source(23), &query(&[("limit", "15")]), SORTABLE, |r| r.id)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 15);
        assert!(page.paging.is_none());
    }

    #[tokio::test]
    async fn offset_alone_returns_the_rest() {
        let page = engine(SortPolicy::Fixed)
            .list(&source(23), &query(&[("offset", "20")]), SORTABLE, |r| r.id)
            .await
            .unwrap();
        assert_eq!(page.items, vec![21, 22, 23]);
        assert!(page.paging.is_none());
    }

    #[tokio::test]
    async fn malformed_window_falls_back_to_pagination() {
        let page = engine(SortPolicy::Fixed)
            .list(&source(5), &query(&[("limit", "lots"), ("offset", "0")]), SORTABLE, |r| r.id)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.paging.map(|p| p.total), Some(5));
    }

    #[tokio::test]
    async fn empty_source_yields_empty_items() {
        let page = engine(SortPolicy::Fixed)
            .list(&MemorySource::with(&[]), &ListQuery::default(), SORTABLE, |r| r.id)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.paging.map(|p| p.last_page), Some(1));
    }

    #[tokio::test]
    async fn legacy_policy_ignores_requested_sort() {
        let src = source(12);
        let legacy = engine(SortPolicy::Legacy);
        for (sort, order) in [("name", "asc"), ("name", "desc"), ("id", "desc"), ("bogus", "desc")] {
            let page = legacy
                .list(&src, &query(&[("sort", sort), ("order", order), ("limit", "12")]), SORTABLE, |r| r.id)
                .await
                .unwrap();
            assert_eq!(page.items, (1..=12).collect::<Vec<_>>(), "sort={sort} order={order}");
            assert_eq!(page.sort.sort_field, sort);
        }
    }

    #[tokio::test]
    async fn fixed_policy_honors_requested_sort() {
        let src = source(12);
        let fixed = engine(SortPolicy::Fixed);

        let by_name = fixed
            .list(&src, &query(&[("sort", "name"), ("limit", "12")]), SORTABLE, |r| r.name)
            .await
            .unwrap();
        let mut expected = names(12);
        expected.sort();
        assert_eq!(by_name.items, expected);

        let by_id_desc = fixed
            .list(&src, &query(&[("sort", "id"), ("order", "desc"), ("limit", "12")]), SORTABLE, |r| r.id)
            .await
            .unwrap();
        assert_eq!(by_id_desc.items, (1..=12).rev().collect::<Vec<_>>());
        assert_eq!(by_id_desc.sort.sort_direction, SortDirection::Desc);
    }
}
