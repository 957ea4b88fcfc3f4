//! Page requests, page results and allow-listed filters.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use utoipa::ToSchema;

use crate::db::store::{Criterion, Match};

/// Number of records per page when the caller does not ask for a size.
pub const DEFAULT_PER_PAGE: u64 = 15;

/// Upper bound for `per_page`; larger requests are clamped.
pub const MAX_PER_PAGE: u64 = 100;

/// Sort field used when the caller does not name one.
pub const DEFAULT_SORT_FIELD: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Invalid sort direction '{other}', expected 'asc' or 'desc'")),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

/// A validated request for one page of records.
///
/// `page` is at least 1 and `per_page` always lies in `1..=MAX_PER_PAGE`; the constructor clamps
/// out-of-range values instead of rejecting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
    sort_field: String,
    sort_direction: SortDirection,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_direction: SortDirection::Desc,
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = field.into();
        self.sort_direction = direction;
        self
    }

    #[inline]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[inline]
    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of records plus the numbers needed to navigate the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            per_page: request.per_page(),
            current_page: request.page(),
        }
    }

    /// Number of the last page. An empty collection still has one (empty) page.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page.max(1)).max(1)
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
        }
    }
}

/// Maps a query-string key onto the document field it filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub param: &'static str,
    pub field: &'static str,
}

impl FilterField {
    /// Filter whose query key is the document field name.
    pub const fn field(name: &'static str) -> Self {
        Self { param: name, field: name }
    }

    /// Filter exposed under a different query key than the stored field.
    pub const fn alias(param: &'static str, field: &'static str) -> Self {
        Self { param, field }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Case-insensitive substring match
    Scalar(String),
    /// Membership test
    List(Vec<String>),
}

/// Filters keyed by document field.
///
/// The only way to build a non-empty `Filters` is through an allow-list, so query keys the
/// resource does not expose never reach the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    entries: BTreeMap<String, FilterValue>,
}

impl Filters {
    pub fn none() -> Self {
        Self::default()
    }

    /// Collect allow-listed filters from decoded query pairs.
    ///
    /// A key repeated in the query, or written with a `[]` suffix, becomes a list. Empty values
    /// and empty lists are dropped.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>, allowed: &[FilterField]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries: BTreeMap<String, FilterValue> = BTreeMap::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let (param, forced_list) = match key.strip_suffix("[]") {
                Some(stripped) => (stripped, true),
                None => (key, false),
            };
            let Some(spec) = allowed.iter().find(|f| f.param == param) else {
                continue;
            };
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            let field = spec.field.to_string();
            match entries.remove(&field) {
                None if forced_list => {
                    entries.insert(field, FilterValue::List(vec![value.to_string()]));
                }
                None => {
                    entries.insert(field, FilterValue::Scalar(value.to_string()));
                }
                Some(FilterValue::Scalar(previous)) => {
                    entries.insert(field, FilterValue::List(vec![previous, value.to_string()]));
                }
                Some(FilterValue::List(mut values)) => {
                    values.push(value.to_string());
                    entries.insert(field, FilterValue::List(values));
                }
            }
        }

        Self { entries }
    }

    /// Add a filter the server sets itself, bypassing the allow-list.
    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.entries.insert(field.into(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.entries.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn criteria(&self) -> Vec<Criterion> {
        self.entries
            .iter()
            .map(|(field, value)| match value {
                FilterValue::Scalar(s) => Criterion::new(field, Match::Contains(s.clone())),
                FilterValue::List(values) => Criterion::new(field, Match::In(values.clone())),
            })
            .collect()
    }
}
