//! Catalog access layer.
//!
//! This module defines the [`PageFetcher`] trait, the [`ListingMode`] a page
//! is requested under, and the single [`FetchError`] kind.  Concrete fetchers
//! live in sub-modules (currently only [`http`]).
//!
//! ## For contributors — adding a new fetcher
//!
//! 1. Create a new file in this directory (e.g. `fixture.rs`).
//! 2. Define a struct and implement [`PageFetcher`] for it.
//! 3. Add `mod fixture;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of [`HttpFetcher`].
//!
//! The pager, the controller and the UI never see anything but
//! [`ProductPage`] and [`FetchError`].

mod http;
mod product;

pub use http::HttpFetcher;
pub use product::{Product, ProductPage};

#[cfg(test)]
pub(crate) use product::tests::make_products;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// What a controller lists: the whole catalog, or the results for one
/// keyword.  Fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingMode {
    All,
    Search(String),
}

impl ListingMode {
    /// Search mode for `keyword`, or `None` if the keyword is blank.
    pub fn search(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            None
        } else {
            Some(Self::Search(keyword.to_string()))
        }
    }

    /// The active keyword, if any.
    pub fn keyword(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Search(k) => Some(k),
        }
    }
}

impl fmt::Display for ListingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all products"),
            Self::Search(k) => write!(f, "search \"{k}\""),
        }
    }
}

/// A page could not be fetched.
///
/// Transport errors, bad HTTP status and undecodable bodies all collapse into
/// this one kind; the cause is kept only so it can be logged.
#[derive(Debug, Error)]
#[error("fetching {mode} page {page} failed: {source}")]
pub struct FetchError {
    pub mode: ListingMode,
    pub page: u32,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    pub fn new(
        mode: &ListingMode,
        page: u32,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            mode: mode.clone(),
            page,
            source: source.into(),
        }
    }
}

/// Anything that can produce one page of products.
///
/// Page numbers are 1-based.  The controller calls
/// [`fetch_page()`](PageFetcher::fetch_page) from its own task, so
/// implementations must be [`Send`] + [`Sync`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Human-readable label used in log lines.
    fn name(&self) -> &str;

    /// Fetch `page` of the listing described by `mode`.
    async fn fetch_page(&self, mode: &ListingMode, page: u32) -> Result<ProductPage, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keyword_is_not_a_search() {
        assert_eq!(ListingMode::search("   "), None);
        assert_eq!(ListingMode::search(""), None);
    }

    #[test]
    fn keyword_is_trimmed() {
        let mode = ListingMode::search("  tofu ").unwrap();
        assert_eq!(mode.keyword(), Some("tofu"));
        assert_eq!(mode.to_string(), "search \"tofu\"");
    }

    #[test]
    fn fetch_error_message_names_mode_and_page() {
        let err = FetchError::new(&ListingMode::All, 3, "connection reset");
        assert_eq!(
            err.to_string(),
            "fetching all products page 3 failed: connection reset"
        );
    }
}
