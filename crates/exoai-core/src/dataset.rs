//! # Dataset Queries
//!
//! Filtering and pagination over an in-memory row set, with the same
//! semantics the service applies to `GET /dataset`:
//! - `mission` keeps rows of that mission only
//! - `search` is a case-insensitive substring match on the row id
//! - `page` is 1-based; page 0 is treated as page 1
//! - `limit` is clamped to `1..=MAX_PAGE_LIMIT`
//!
//! `total` counts the filtered set, not the page.

use crate::primitives::MAX_PAGE_LIMIT;
use crate::types::{DatasetPage, DatasetQuery, DatasetRow};

/// Whether `row` passes the query's filters.
#[must_use]
pub fn matches(row: &DatasetRow, query: &DatasetQuery) -> bool {
    if query.mission.is_some_and(|m| m != row.mission) {
        return false;
    }
    match query.search.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(needle) => row
            .id
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase()),
    }
}

/// Filter `rows` and cut out the requested page.
#[must_use]
pub fn apply_query(rows: Vec<DatasetRow>, query: &DatasetQuery) -> DatasetPage {
    let filtered: Vec<DatasetRow> = rows.into_iter().filter(|r| matches(r, query)).collect();
    let total = filtered.len() as u64;

    let limit = query.limit.clamp(1, MAX_PAGE_LIMIT) as usize;
    let page = query.page.max(1) as usize;
    let start = (page - 1).saturating_mul(limit);

    let rows = filtered.into_iter().skip(start).take(limit).collect();
    DatasetPage { rows, total }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::substitute::dataset_rows;
    use crate::types::Mission;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rows(n: usize) -> Vec<DatasetRow> {
        dataset_rows(n, &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn default_query_returns_first_page() {
        let page = apply_query(rows(100), &DatasetQuery::default());
        assert_eq!(page.total, 100);
        assert_eq!(page.rows.len(), 25);
        assert_eq!(page.rows[0].id, "KOI-0001");
    }

    #[test]
    fn mission_filter_counts_filtered_total() {
        let query = DatasetQuery {
            mission: Some(Mission::Tess),
            limit: 10,
            ..DatasetQuery::default()
        };
        let page = apply_query(rows(99), &query);
        assert_eq!(page.total, 33);
        assert!(page.rows.iter().all(|r| r.mission == Mission::Tess));
    }

    #[test]
    fn search_is_case_insensitive() {
        let query = DatasetQuery {
            search: Some("epic-000".into()),
            ..DatasetQuery::default()
        };
        let page = apply_query(rows(12), &query);
        let ids: Vec<&str> = page.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["EPIC-0002", "EPIC-0005", "EPIC-0008"]);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let query = DatasetQuery {
            page: 9,
            limit: 25,
            ..DatasetQuery::default()
        };
        let page = apply_query(rows(100), &query);
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 100);
    }

    #[test]
    fn page_zero_and_zero_limit_are_clamped() {
        let query = DatasetQuery {
            page: 0,
            limit: 0,
            ..DatasetQuery::default()
        };
        let page = apply_query(rows(5), &query);
        assert_eq!(page.rows.len(), 1);
    }
}
