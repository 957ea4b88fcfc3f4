//! List query parsing and the shared paginated collection shape.
//!
//! Admin list endpoints accept `page`, `per_page`, `sort_field`, `sort_direction` and the
//! resource's allow-listed filter keys from the raw query string. Filter values may repeat
//! (`status=a&status=b` or `status[]=a`) to request a membership test.

use axum::http::Uri;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use url::form_urlencoded;
use utoipa::{IntoParams, ToSchema};

use crate::db::models::paging::{
    DEFAULT_PER_PAGE, DEFAULT_SORT_FIELD, FilterField, Filters, MAX_PER_PAGE, PageRequest, Paginated, SortDirection,
};
use crate::errors::{Error, Result};

/// Page and filters decoded from a list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: PageRequest,
    pub filters: Filters,
}

/// A plain identifier: ASCII letter or underscore, then letters, digits or underscores.
pub fn validate_ident(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Lenient number parsing: anything unparseable falls back to `default`, then clamps.
fn bounded(raw: Option<&str>, default: u64, max: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v.clamp(1, max as i64) as u64)
        .unwrap_or(default)
}

/// Decode a raw query string against a filter allow-list.
pub fn parse_list_query(raw: Option<&str>, allowed: &[FilterField]) -> Result<ListQuery> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();
    let first = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

    let page = bounded(first("page"), 1, u64::MAX >> 1);
    let per_page = bounded(first("per_page"), DEFAULT_PER_PAGE, MAX_PER_PAGE);

    let sort_field = match first("sort_field").map(str::trim).filter(|s| !s.is_empty()) {
        Some(field) if validate_ident(field) => field,
        Some(field) => {
            return Err(Error::BadRequest {
                message: format!("Invalid sort field '{field}'"),
            });
        }
        None => DEFAULT_SORT_FIELD,
    };
    let sort_direction = match first("sort_direction").map(str::trim).filter(|s| !s.is_empty()) {
        Some(direction) => direction
            .parse::<SortDirection>()
            .map_err(|message| Error::BadRequest { message })?,
        None => SortDirection::default(),
    };

    Ok(ListQuery {
        page: PageRequest::new(page, per_page).sorted_by(sort_field, sort_direction),
        filters: Filters::from_pairs(pairs.iter().map(|(k, v)| (k, v)), allowed),
    })
}

/// `limit` for the fixed-size public listings.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LimitQuery {
    /// Maximum number of items to return (max: 100)
    #[param(minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<u64>,
}

impl LimitQuery {
    #[inline]
    pub fn limit_or(&self, default: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, MAX_PER_PAGE)
    }
}

/// `page` and `per_page` for the public paginated listings.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Page number, starting at 1
    #[param(default = 1, minimum = 1)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<u64>,

    /// Items per page (default: 15, max: 100)
    #[param(default = 15, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub per_page: Option<u64>,
}

impl PageQuery {
    #[inline]
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    #[inline]
    pub fn per_page(&self) -> u64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    pub total: u64,
    /// Items on this page
    pub count: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub has_more_pages: bool,
}

/// Relative URLs to neighbouring pages. `prev` and `next` are null at the edges.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
    #[serde(rename = "self")]
    pub current: String,
}

/// A page of view models with its metadata and navigation links.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionView<V> {
    pub data: Vec<V>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

/// Same path and query as `uri`, with `page` set.
fn page_link(uri: &Uri, page: u64) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()) {
        if key != "page" {
            query.append_pair(&key, &value);
        }
    }
    query.append_pair("page", &page.to_string());
    format!("{}?{}", uri.path(), query.finish())
}

impl<V> CollectionView<V> {
    pub fn new<E>(page: Paginated<E>, uri: &Uri) -> Self
    where
        V: From<E>,
    {
        let total_pages = page.total_pages();
        let has_more_pages = page.has_more_pages();
        let current_page = page.current_page;
        let meta = PageMeta {
            total: page.total,
            count: page.items.len() as u64,
            per_page: page.per_page,
            current_page,
            total_pages,
            has_more_pages,
        };
        let links = PageLinks {
            first: page_link(uri, 1),
            last: page_link(uri, total_pages),
            prev: (current_page > 1).then(|| page_link(uri, current_page - 1)),
            next: has_more_pages.then(|| page_link(uri, current_page + 1)),
            current: page_link(uri, current_page),
        };
        Self {
            data: page.items.into_iter().map(V::from).collect(),
            meta,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::paging::FilterValue;

    const ALLOWED: &[FilterField] = &[FilterField::field("status"), FilterField::alias("category", "category_id")];

    #[test]
    fn test_defaults() {
        let query = parse_list_query(None, ALLOWED).unwrap();
        assert_eq!(query.page.page(), 1);
        assert_eq!(query.page.per_page(), 15);
        assert_eq!(query.page.sort_field(), "created_at");
        assert_eq!(query.page.sort_direction(), SortDirection::Desc);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_per_page_is_clamped_and_lenient() {
        let parse = |raw: &str| parse_list_query(Some(raw), ALLOWED).unwrap().page.per_page();
        assert_eq!(parse("per_page=500"), 100);
        assert_eq!(parse("per_page=0"), 1);
        assert_eq!(parse("per_page=-3"), 1);
        assert_eq!(parse("per_page=lots"), 15);
    }

    #[test]
    fn test_filters_respect_allow_list() {
        let query = parse_list_query(Some("status=active&secret=x&category[]=a&category[]=b&page=2"), ALLOWED).unwrap();
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters.get("status"), Some(&FilterValue::Scalar("active".into())));
        assert_eq!(
            query.filters.get("category_id"),
            Some(&FilterValue::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(query.page.page(), 2);
    }

    #[test]
    fn test_bad_sorting_is_rejected() {
        assert!(parse_list_query(Some("sort_field=title;drop"), ALLOWED).is_err());
        assert!(parse_list_query(Some("sort_direction=sideways"), ALLOWED).is_err());
        let query = parse_list_query(Some("sort_field=title&sort_direction=ASC"), ALLOWED).unwrap();
        assert_eq!(query.page.sort_field(), "title");
        assert_eq!(query.page.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn test_validate_ident() {
        assert!(validate_ident("created_at"));
        assert!(validate_ident("_x1"));
        assert!(!validate_ident("1x"));
        assert!(!validate_ident("a-b"));
        assert!(!validate_ident(""));
    }

    #[test]
    fn test_collection_links() {
        let uri: Uri = "/api/v1/admin/news?status=active&page=2&per_page=1".parse().unwrap();
        let page = Paginated::new(vec![1, 2], 5, &PageRequest::new(2, 2));
        let view: CollectionView<i64> = CollectionView::new(page, &uri);

        assert_eq!(view.meta.total_pages, 3);
        assert_eq!(view.meta.count, 2);
        assert_eq!(view.links.first, "/api/v1/admin/news?status=active&per_page=1&page=1");
        assert_eq!(view.links.prev.as_deref(), Some("/api/v1/admin/news?status=active&per_page=1&page=1"));
        assert_eq!(view.links.next.as_deref(), Some("/api/v1/admin/news?status=active&per_page=1&page=3"));
        assert_eq!(view.links.last, "/api/v1/admin/news?status=active&per_page=1&page=3");
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let uri: Uri = "/api/v1/admin/news".parse().unwrap();
        let page: Paginated<i64> = Paginated::new(vec![], 0, &PageRequest::default());
        let view: CollectionView<i64> = CollectionView::new(page, &uri);
        assert_eq!(view.meta.total_pages, 1);
        assert_eq!(view.meta.current_page, 1);
        assert!(view.links.prev.is_none() && view.links.next.is_none());
        assert_eq!(view.links.current, "/api/v1/admin/news?page=1");
    }
}
