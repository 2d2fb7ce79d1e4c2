//! Pagination state machine.
//!
//! [`Pager`] owns the product sequence, the page cursor and the fetch gate
//! for one listing.  It performs no I/O: the controller feeds it scroll
//! events and fetch results and carries out the fetch it asks for.
//!
//! ```text
//!            near bottom                page accepted
//!   Idle ───────────────► Fetching ───────────────────► Settling
//!    ▲                      │                              │
//!    │   failure / held     │                              │
//!    ├──────────────────────┘                              │
//!    └──────────────────── settle delay elapsed ───────────┘
//! ```
//!
//! There is no terminal state: the API never says "no more pages", so the
//! pager keeps asking for the next one whenever the user reaches the bottom.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::catalog::{FetchError, ListingMode, Product, ProductPage};
use crate::viewport::Viewport;

/// First page requested by scrolling; page 1 is always preloaded.
pub const FIRST_SCROLLED_PAGE: u32 = 2;

/// Gate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Gate open.
    Idle,
    /// Gate closed, request for `page` outstanding.
    Fetching { page: u32 },
    /// Gate closed until the settle delay elapses.
    Settling,
}

/// What to do with a page that came back with no products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPagePolicy {
    /// Accept it like any other page: cursor advances, settle delay runs.
    Advance,
    /// Reject it: nothing changes and the same page is requested again on
    /// the next qualifying scroll.
    Hold,
}

impl EmptyPagePolicy {
    /// The full feed advances past empty pages; search results hold.
    pub fn for_mode(mode: &ListingMode) -> Self {
        match mode {
            ListingMode::All => Self::Advance,
            ListingMode::Search(_) => Self::Hold,
        }
    }
}

/// Result of the most recent fetch, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded {
        page: u32,
        count: usize,
        at: DateTime<Local>,
    },
    Empty {
        page: u32,
    },
    Failed {
        page: u32,
    },
}

/// What the controller must do after a fetch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterFetch {
    /// Wait out the settle delay, then call [`Pager::settle`].
    Settle,
    /// Gate is open again already.
    Rearmed,
}

/// Snapshot of a pager for the render surface.
#[derive(Debug, Clone)]
pub struct PagerSnapshot {
    pub mode: ListingMode,
    pub products: Arc<Vec<Product>>,
    pub next_page: u32,
    pub phase: Phase,
    pub last_outcome: Option<Outcome>,
}

impl PagerSnapshot {
    /// Snapshot of a listing with nothing loaded and no controller behind it.
    pub fn empty(mode: ListingMode) -> Self {
        Self {
            mode,
            products: Arc::new(Vec::new()),
            next_page: FIRST_SCROLLED_PAGE,
            phase: Phase::Idle,
            last_outcome: None,
        }
    }
}

#[derive(Debug)]
pub struct Pager {
    mode: ListingMode,
    products: Arc<Vec<Product>>,
    next_page: u32,
    phase: Phase,
    tolerance: u32,
    empty_pages: EmptyPagePolicy,
    last_outcome: Option<Outcome>,
}

impl Pager {
    /// Seed a pager with the preloaded first page.
    pub fn new(
        mode: ListingMode,
        preloaded: Vec<Product>,
        tolerance: u32,
        empty_pages: EmptyPagePolicy,
    ) -> Self {
        Self {
            mode,
            products: Arc::new(preloaded),
            next_page: FIRST_SCROLLED_PAGE,
            phase: Phase::Idle,
            tolerance,
            empty_pages,
            last_outcome: None,
        }
    }

    pub fn mode(&self) -> &ListingMode {
        &self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn snapshot(&self) -> PagerSnapshot {
        PagerSnapshot {
            mode: self.mode.clone(),
            products: Arc::clone(&self.products),
            next_page: self.next_page,
            phase: self.phase,
            last_outcome: self.last_outcome.clone(),
        }
    }

    /// Handle a scroll event.
    ///
    /// Returns the page to fetch if the gate was open and the viewport is
    /// near the bottom; the gate is closed before returning.
    pub fn on_scroll(&mut self, viewport: Viewport) -> Option<u32> {
        if self.phase != Phase::Idle {
            return None;
        }
        if !viewport.is_near_bottom(self.tolerance) {
            return None;
        }

        let page = self.next_page;
        debug!(mode = %self.mode, page, ?viewport, "near bottom, fetching");
        self.phase = Phase::Fetching { page };
        Some(page)
    }

    /// Fold a fetch result into the sequence.
    ///
    /// Ignored (returns [`AfterFetch::Rearmed`] without changes) if no fetch
    /// was outstanding.
    pub fn on_fetch_complete(&mut self, result: Result<ProductPage, FetchError>) -> AfterFetch {
        let Phase::Fetching { page } = self.phase else {
            return AfterFetch::Rearmed;
        };

        match result {
            Ok(fetched) if fetched.is_empty() && self.empty_pages == EmptyPagePolicy::Hold => {
                info!(mode = %self.mode, page, "empty page, holding cursor");
                self.last_outcome = Some(Outcome::Empty { page });
                self.phase = Phase::Idle;
                AfterFetch::Rearmed
            }
            Ok(fetched) => {
                let count = fetched.products.len();
                Arc::make_mut(&mut self.products).extend(fetched.products);
                self.next_page += 1;
                self.phase = Phase::Settling;
                self.last_outcome = Some(if count == 0 {
                    Outcome::Empty { page }
                } else {
                    Outcome::Loaded {
                        page,
                        count,
                        at: Local::now(),
                    }
                });
                info!(
                    mode = %self.mode,
                    page,
                    count,
                    total = self.products.len(),
                    "page appended"
                );
                AfterFetch::Settle
            }
            Err(e) => {
                warn!(error = %e, "page fetch failed, will retry on next scroll");
                self.last_outcome = Some(Outcome::Failed { page });
                self.phase = Phase::Idle;
                AfterFetch::Rearmed
            }
        }
    }

    /// Reopen the gate after the settle delay.
    pub fn settle(&mut self) {
        if self.phase == Phase::Settling {
            self.phase = Phase::Idle;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::make_products;

    const BOTTOM: Viewport = Viewport {
        content_height: 1000,
        offset: 800,
        visible_height: 200,
    };

    const MIDDLE: Viewport = Viewport {
        content_height: 1000,
        offset: 100,
        visible_height: 200,
    };

    fn feed_pager(preloaded: usize) -> Pager {
        Pager::new(
            ListingMode::All,
            make_products("p1", preloaded),
            0,
            EmptyPagePolicy::Advance,
        )
    }

    fn search_pager(preloaded: usize) -> Pager {
        let mode = ListingMode::search("tofu").unwrap();
        let policy = EmptyPagePolicy::for_mode(&mode);
        Pager::new(mode, make_products("p1", preloaded), 20, policy)
    }

    fn page(n: u32, count: usize) -> Result<ProductPage, FetchError> {
        Ok(ProductPage::new(n, make_products(&format!("p{n}"), count)))
    }

    fn failure(n: u32) -> Result<ProductPage, FetchError> {
        Err(FetchError::new(&ListingMode::All, n, "connection refused"))
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn starts_idle_at_page_two() {
        let pager = feed_pager(20);
        assert_eq!(pager.phase(), Phase::Idle);
        assert_eq!(pager.next_page(), 2);
        assert_eq!(pager.products().len(), 20);
    }

    #[test]
    fn default_empty_page_policy_follows_mode() {
        assert_eq!(
            EmptyPagePolicy::for_mode(&ListingMode::All),
            EmptyPagePolicy::Advance
        );
        assert_eq!(
            EmptyPagePolicy::for_mode(&ListingMode::Search("x".into())),
            EmptyPagePolicy::Hold
        );
    }

    // -- gate ----------------------------------------------------------------

    #[test]
    fn scroll_away_from_bottom_does_nothing() {
        let mut pager = feed_pager(20);
        assert_eq!(pager.on_scroll(MIDDLE), None);
        assert_eq!(pager.phase(), Phase::Idle);
    }

    #[test]
    fn scroll_at_bottom_requests_cursor_page() {
        let mut pager = feed_pager(20);
        assert_eq!(pager.on_scroll(BOTTOM), Some(2));
        assert_eq!(pager.phase(), Phase::Fetching { page: 2 });
    }

    #[test]
    fn gate_admits_one_fetch_at_a_time() {
        let mut pager = feed_pager(20);
        assert_eq!(pager.on_scroll(BOTTOM), Some(2));
        for _ in 0..10 {
            assert_eq!(pager.on_scroll(BOTTOM), None);
        }

        assert_eq!(pager.on_fetch_complete(page(2, 20)), AfterFetch::Settle);
        assert_eq!(pager.on_scroll(BOTTOM), None, "settling keeps the gate closed");

        pager.settle();
        assert_eq!(pager.on_scroll(BOTTOM), Some(3));
    }

    #[test]
    fn search_tolerance_triggers_early() {
        let near = Viewport::new(1000, 780, 200);
        assert_eq!(search_pager(20).on_scroll(near), Some(2));
        assert_eq!(feed_pager(20).on_scroll(near), None);
    }

    // -- successful fetches --------------------------------------------------

    #[test]
    fn twenty_plus_twenty_is_forty() {
        let mut pager = feed_pager(20);
        pager.on_scroll(BOTTOM);
        assert_eq!(pager.on_fetch_complete(page(2, 20)), AfterFetch::Settle);
        assert_eq!(pager.phase(), Phase::Settling);

        pager.settle();

        assert_eq!(pager.products().len(), 40);
        assert_eq!(pager.next_page(), 3);
        assert_eq!(pager.phase(), Phase::Idle);
    }

    #[test]
    fn sequence_is_concatenation_in_page_order() {
        let mut pager = feed_pager(3);
        let mut expected = make_products("p1", 3);

        for n in 2..=6 {
            assert_eq!(pager.on_scroll(BOTTOM), Some(n));
            let fetched = page(n, n as usize);
            expected.extend(fetched.as_ref().unwrap().products.clone());
            pager.on_fetch_complete(fetched);
            pager.settle();
        }

        assert_eq!(pager.products(), expected.as_slice());
        assert_eq!(pager.next_page(), 2 + 5);
    }

    #[test]
    fn loaded_outcome_records_page_and_count() {
        let mut pager = feed_pager(1);
        pager.on_scroll(BOTTOM);
        pager.on_fetch_complete(page(2, 7));

        match pager.snapshot().last_outcome {
            Some(Outcome::Loaded { page, count, .. }) => {
                assert_eq!(page, 2);
                assert_eq!(count, 7);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn snapshot_is_not_affected_by_later_appends() {
        let mut pager = feed_pager(2);
        let before = pager.snapshot();

        pager.on_scroll(BOTTOM);
        pager.on_fetch_complete(page(2, 2));

        assert_eq!(before.products.len(), 2);
        assert_eq!(pager.snapshot().products.len(), 4);
    }

    // -- failures ------------------------------------------------------------

    #[test]
    fn failure_leaves_state_and_retries_same_page() {
        let mut pager = feed_pager(20);
        pager.on_scroll(BOTTOM);

        assert_eq!(pager.on_fetch_complete(failure(2)), AfterFetch::Rearmed);
        assert_eq!(pager.products().len(), 20);
        assert_eq!(pager.next_page(), 2);
        assert_eq!(pager.phase(), Phase::Idle);
        assert!(matches!(
            pager.snapshot().last_outcome,
            Some(Outcome::Failed { page: 2 })
        ));

        assert_eq!(pager.on_scroll(BOTTOM), Some(2));
    }

    #[test]
    fn repeated_failures_never_advance() {
        let mut pager = feed_pager(5);
        for _ in 0..5 {
            assert_eq!(pager.on_scroll(BOTTOM), Some(2));
            pager.on_fetch_complete(failure(2));
        }
        assert_eq!(pager.next_page(), 2);
        assert_eq!(pager.products().len(), 5);
    }

    // -- empty pages ---------------------------------------------------------

    #[test]
    fn search_holds_on_empty_page() {
        let mut pager = search_pager(20);
        pager.on_scroll(BOTTOM);
        pager.on_fetch_complete(page(2, 20));
        pager.settle();

        assert_eq!(pager.on_scroll(BOTTOM), Some(3));
        assert_eq!(pager.on_fetch_complete(page(3, 0)), AfterFetch::Rearmed);
        assert_eq!(pager.products().len(), 40);
        assert_eq!(pager.next_page(), 3);
        assert_eq!(pager.phase(), Phase::Idle);
        assert_eq!(pager.snapshot().last_outcome, Some(Outcome::Empty { page: 3 }));

        assert_eq!(pager.on_scroll(BOTTOM), Some(3));
    }

    #[test]
    fn feed_advances_past_empty_page() {
        let mut pager = feed_pager(20);
        pager.on_scroll(BOTTOM);

        assert_eq!(pager.on_fetch_complete(page(2, 0)), AfterFetch::Settle);
        assert_eq!(pager.products().len(), 20);
        assert_eq!(pager.next_page(), 3);
        assert_eq!(pager.phase(), Phase::Settling);
    }

    // -- stray events --------------------------------------------------------

    #[test]
    fn result_without_outstanding_fetch_is_ignored() {
        let mut pager = feed_pager(1);
        assert_eq!(pager.on_fetch_complete(page(2, 3)), AfterFetch::Rearmed);
        assert_eq!(pager.products().len(), 1);
        assert_eq!(pager.next_page(), 2);
    }

    #[test]
    fn settle_outside_settling_is_noop() {
        let mut pager = feed_pager(1);
        pager.on_scroll(BOTTOM);
        pager.settle();
        assert_eq!(pager.phase(), Phase::Fetching { page: 2 });
    }
}
