//! Post listings: scopes, page numbers and the paginator shared by the feed,
//! group and profile views.
//!
//! A listing is evaluated in two explicit steps. The caller resolves a
//! [`Scope`] into a [`PostFilter`], counts the matching posts, and asks the
//! [`Paginator`] for a [`PostQuery`] (filter + offset + limit). The query is
//! handed to the store as-is; nothing is evaluated lazily.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Posts per listing page.
pub const PAGE_SIZE: u64 = 10;

/// Which posts a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Group(String),
    Author(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown scope selector: {0}")]
pub struct ScopeParseError(String);

impl FromStr for Scope {
    type Err = ScopeParseError;

    /// Parses `all`, `group:<slug>` or `author:<username>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Scope::All);
        }
        match s.split_once(':') {
            Some(("group", slug)) if !slug.is_empty() => Ok(Scope::Group(slug.to_string())),
            Some(("author", username)) if !username.is_empty() => {
                Ok(Scope::Author(username.to_string()))
            }
            _ => Err(ScopeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Group(slug) => write!(f, "group:{}", slug),
            Scope::Author(username) => write!(f, "author:{}", username),
        }
    }
}

/// A scope after its group or author has been looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
}

impl PostFilter {
    pub fn matches(&self, author_id: Uuid, group_id: Option<Uuid>) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::Group(id) => group_id == Some(*id),
            PostFilter::Author(id) => author_id == *id,
        }
    }
}

/// One page worth of posts, newest first (ties by descending id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub offset: u64,
    pub limit: u64,
}

impl PostQuery {
    /// The index range this query selects out of `len` ordered rows.
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX).min(len);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        start..start.saturating_add(limit).min(len)
    }
}

/// A requested page number. Anything that is not a positive integer means page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageRequest(u64);

impl PageRequest {
    pub fn new(number: u64) -> Self {
        Self(number.max(1))
    }

    /// Read the raw `page` query parameter.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<u64>().ok())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn number(self) -> u64 {
        self.0
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

/// Splits `count` items into pages of `per_page`.
///
/// An empty collection still has one (empty) page, so `num_pages` is never 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn num_pages(&self) -> u64 {
        if self.count == 0 {
            1
        } else {
            self.count.div_ceil(self.per_page)
        }
    }

    /// The page actually served for a request; past-the-end clamps to the last page.
    pub fn clamp(&self, request: PageRequest) -> u64 {
        request.number().min(self.num_pages())
    }

    pub fn query(&self, filter: PostFilter, request: PageRequest) -> PostQuery {
        let number = self.clamp(request);
        PostQuery {
            filter,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    pub fn page<T>(&self, request: PageRequest, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.clamp(request),
            num_pages: self.num_pages(),
            count: self.count,
            per_page: self.per_page,
        }
    }
}

/// A bounded slice of a listing plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    /// 1-based index of the first item on this page, 0 when empty.
    pub fn start_index(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page, 0 when empty.
    pub fn end_index(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.start_index() + self.items.len() as u64 - 1
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
        }
    }
}
