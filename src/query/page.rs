//! Cursor pagination over creation time
//!
//! A cursor is the millisecond timestamp of the last row of the previous
//! page, `0` for the first page. Listings select `created_at <= cursor` in
//! descending order and fetch one row more than the page size; when that
//! extra row arrives, its timestamp becomes the next cursor. The boundary
//! row is therefore both the last row of a page and the first row of the
//! next one.
//!
//! Cursor progress assumes one writer per store: timestamps are unique only
//! within one repository, and more than `limit` rows sharing the boundary
//! timestamp would make the same page come back forever.

use super::pairs::is_strictly_descending_by;
use serde::{Deserialize, Serialize};

/// Pagination cursor (milliseconds since the Unix epoch)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(i64);

impl Cursor {
    /// Cursor of the first page
    pub const FIRST: Cursor = Cursor(0);

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn is_first(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position and size of a requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Cursor,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(cursor: Cursor, limit: usize) -> Self {
        Self { cursor, limit }
    }

    /// Rows to ask the store for: one more than the page size, so the
    /// presence of a next page is known without counting
    pub fn fetch_limit(&self) -> usize {
        self.limit.saturating_add(1)
    }

    /// `fetch_limit` as a SQL `LIMIT` value, capped at `i64::MAX`
    pub fn sql_limit(&self) -> i64 {
        i64::try_from(self.fetch_limit()).unwrap_or(i64::MAX)
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Every fetched row, including the boundary row when there is a next page
    pub items: Vec<T>,
    pub next_cursor: Option<Cursor>,
    pub limit: usize,
}

impl<T> Page<T> {
    /// Build a page from fetched rows, newest first. Returns `None` when
    /// nothing was fetched.
    pub fn from_rows<F>(rows: Vec<T>, request: &PageRequest, created_at: F) -> Option<Self>
    where
        F: Fn(&T) -> i64,
    {
        if rows.is_empty() {
            return None;
        }
        let next_cursor = if rows.len() > request.limit {
            rows.last().map(|row| Cursor::from_millis(created_at(row)))
        } else {
            None
        };
        Some(Self {
            items: rows,
            next_cursor,
            limit: request.limit,
        })
    }

    /// The rows a caller should present: the page without its boundary row
    pub fn served(&self) -> &[T] {
        let end = self.items.len().min(self.limit);
        &self.items[..end]
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check the newest-first ordering invariant
    pub fn is_strictly_descending<F>(&self, created_at: F) -> bool
    where
        F: Fn(&T) -> i64,
    {
        is_strictly_descending_by(&self.items, created_at)
    }
}
