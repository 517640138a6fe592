use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::query::QueryMap;

/// Per-resource-type pagination defaults. The maximum is enforced no matter
/// what page size the client requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatorConfig {
    pub per_page: u32,
    pub max_page_size: u32,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            per_page: 20,
            max_page_size: 100,
        }
    }
}

/// Page/page_size pair taken from the query string, clamped to the
/// configured bounds. Pages are 1-indexed.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
}

impl PageParams {
    pub fn from_query(query: &QueryMap, config: &PaginatorConfig) -> Self {
        let page = query.get_u32("page").filter(|p| *p >= 1).unwrap_or(1);
        let mut page_size = query.get_u32("page_size").unwrap_or(config.per_page);
        if page_size > config.max_page_size {
            page_size = config.max_page_size;
        }
        if page_size == 0 {
            page_size = config.per_page;
        }
        Self { page, page_size }
    }
}

/// Offset/limit window into the filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

fn total_pages(total_count: i64, page_size: u32) -> u32 {
    // An empty result set still has one (empty) page so page=1 never 404s.
    let pages = (total_count as u64).div_ceil(page_size as u64) as u32;
    pages.max(1)
}

/// Compute the window for a page, or None when the page is past the end of
/// the filtered result set. Callers translate None into a 404.
pub fn window(params: &PageParams, total_count: i64) -> Option<PageWindow> {
    if params.page > total_pages(total_count, params.page_size) {
        return None;
    }
    Some(PageWindow {
        offset: (params.page as i64 - 1) * params.page_size as i64,
        limit: params.page_size as i64,
    })
}

/// Pagination metadata merged into the response envelope, computed from the
/// filtered query's total count.
pub fn details(params: &PageParams, total_count: i64) -> Map<String, Value> {
    let pages = total_pages(total_count, params.page_size);
    let mut details = Map::new();
    details.insert("page".to_string(), json!(params.page));
    details.insert("total_pages".to_string(), json!(pages));
    details.insert("page_size".to_string(), json!(params.page_size));
    details.insert("total_count".to_string(), json!(total_count));
    details.insert("has_next".to_string(), json!(params.page < pages));
    details.insert("has_prev".to_string(), json!(params.page > 1));
    details
}
