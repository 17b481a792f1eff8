//! Paging and sorting shared by product and order listings.
//!
//! Sort keys arrive as DTO field names (`productName`, `orderDate`) and are
//! resolved against a per-entity whitelist, so only known columns ever reach
//! an `ORDER BY` clause.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

/// Raw `pageNumber` / `pageSize` / `sortBy` / `sortOrder` query parameters
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `asc` in any case sorts ascending; everything else sorts descending.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sortable fields of one entity plus its listing defaults
#[derive(Debug)]
pub struct SortSpec {
    /// (DTO field name, qualified column)
    pub fields: &'static [(&'static str, &'static str)],
    /// Column appended to every ordering so pages are stable
    pub tiebreak: &'static str,
    pub default_field: &'static str,
    pub default_direction: SortDirection,
    /// Overrides the configured page size when set
    pub default_page_size: Option<u32>,
}

impl SortSpec {
    pub fn column_for(&self, field: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
    }
}

/// A validated page request
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
    pub sort_column: &'static str,
    pub direction: SortDirection,
    tiebreak: &'static str,
}

impl PageRequest {
    pub fn resolve(params: &PageParams, spec: &SortSpec, configured_page_size: u32) -> ApiResult<Self> {
        let page_size = params
            .page_size
            .or(spec.default_page_size)
            .unwrap_or(configured_page_size);
        if page_size == 0 {
            return Err(ApiError::api("Page size must be greater than zero"));
        }

        let field = params.sort_by.as_deref().unwrap_or(spec.default_field);
        let sort_column = spec
            .column_for(field)
            .ok_or_else(|| ApiError::api(format!("Invalid sort field: {}", field)))?;

        let direction = params
            .sort_order
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or(spec.default_direction);

        Ok(Self {
            page_number: params.page_number.unwrap_or(0),
            page_size,
            sort_column,
            direction,
            tiebreak: spec.tiebreak,
        })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page_number) * i64::from(self.page_size)
    }

    /// Body of the `ORDER BY` clause, e.g. `p.price ASC, p.product_id ASC`
    pub fn order_clause(&self) -> String {
        let dir = self.direction.as_sql();
        if self.sort_column == self.tiebreak {
            format!("{} {}", self.sort_column, dir)
        } else {
            format!("{} {}, {} {}", self.sort_column, dir, self.tiebreak, dir)
        }
    }
}

/// One page of results in the shape every listing endpoint returns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub content: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
    pub last_page: bool,
}

impl<T> PagedResponse<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let size = i64::from(request.page_size);
        let total_pages = (total_elements + size - 1) / size;
        Self {
            content,
            page_number: request.page_number,
            page_size: request.page_size,
            total_elements,
            total_pages,
            last_page: i64::from(request.page_number) + 1 >= total_pages,
        }
    }
}
