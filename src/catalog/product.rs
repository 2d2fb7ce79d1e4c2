//! The product record and the page wrapper returned by every fetcher.
//!
//! `Product` mirrors the JSON shape of the catalog API one-to-one.  Every
//! [`PageFetcher`](super::PageFetcher) implementation hands back a
//! [`ProductPage`] so the pager never has to look at wire formats.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Stable product identifier.
///
/// The API is not consistent about whether ids are strings or integers, so
/// both are accepted and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self::new(s),
            Raw::Int(n) => Self::new(n.to_string()),
        })
    }
}

/// A single catalog entry, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub id: ProductId,

    pub title: String,

    /// Integer price with no currency attached.
    pub price: i64,

    /// Image URL; the terminal only displays it in the detail view.
    pub thumbnail: String,

    /// External shop page for the product.
    pub landing_url: String,

    /// Number of reviews.
    pub review: u64,
}

impl Product {
    /// Route of the in-app detail view for this product.
    pub fn detail_path(&self) -> String {
        format!("/id/{}", self.id)
    }
}

/// One fetched page: its products in arrival order plus the page number it
/// was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub page: u32,
    pub products: Vec<Product>,
}

impl ProductPage {
    pub fn new(page: u32, products: Vec<Product>) -> Self {
        Self { page, products }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Response envelope of both listing endpoints.
///
/// A missing or `null` `products` field is treated the same as an empty list.
#[derive(Debug, Deserialize)]
pub(crate) struct PageBody {
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

impl PageBody {
    pub fn into_page(self, page: u32) -> ProductPage {
        ProductPage::new(page, self.products.unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
