use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

/// Offset/limit pair accepted by every ranking endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
}

impl PageQuery {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    pub fn first(limit: i64) -> Self {
        Self { offset: 0, limit }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_LIMIT)
    }
}

/// A bounded slice of a larger result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: PageQuery) -> Self {
        Self {
            items,
            total,
            offset: query.offset,
            limit: query.limit,
        }
    }

    /// Checks the page invariants the presentation layer relies on.
    ///
    /// `offset > total` is accepted: rows can disappear between two fetches,
    /// so a page past the end is a legitimate empty page, not a decode error.
    pub fn check_bounds(&self) -> Result<(), String> {
        if self.total < 0 {
            return Err(format!("negative total {}", self.total));
        }
        if self.offset < 0 {
            return Err(format!("negative offset {}", self.offset));
        }
        if self.limit < 1 {
            return Err(format!("limit must be positive, got {}", self.limit));
        }
        if self.items.len() as i64 > self.limit {
            return Err(format!(
                "{} items exceed the page limit of {}",
                self.items.len(),
                self.limit
            ));
        }
        Ok(())
    }
}
