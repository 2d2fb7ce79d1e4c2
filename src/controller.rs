//! Infinite-scroll controller.
//!
//! Runs one [`Pager`] on a dedicated tokio task.  The task waits for scroll
//! events, performs the fetch the pager asks for, sleeps through the settle
//! delay, and publishes a [`PagerSnapshot`] over a [`watch`] channel after
//! every transition.
//!
//! ## For contributors
//!
//! Everything that mutates the pager happens inside [`run`], one await at a
//! time, so there is never more than one writer.  Dropping the
//! [`Controller`] aborts the task: an in-flight request or settle delay is
//! cancelled and the scroll subscription is released with it.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::catalog::{ListingMode, PageFetcher, Product};
use crate::pager::{AfterFetch, EmptyPagePolicy, Pager, PagerSnapshot, Phase};
use crate::scroll::ScrollSubscription;

/// Default pause after an accepted page before the gate reopens.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(2000);

/// Tuning knobs for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Extra slack for the near-bottom test.
    pub tolerance: u32,
    pub settle: Duration,
    pub empty_pages: EmptyPagePolicy,
}

impl ControllerConfig {
    /// Defaults for `mode`: no tolerance, 2 s settle, and the mode's own
    /// empty-page policy.
    pub fn for_mode(mode: &ListingMode) -> Self {
        Self {
            tolerance: 0,
            settle: DEFAULT_SETTLE,
            empty_pages: EmptyPagePolicy::for_mode(mode),
        }
    }
}

/// Handle to a running controller task.
pub struct Controller {
    mode: ListingMode,
    task: Option<JoinHandle<()>>,
    updates: watch::Receiver<PagerSnapshot>,
}

impl Controller {
    /// Start a controller for `mode` seeded with the preloaded first page.
    pub fn spawn(
        runtime: &Handle,
        fetcher: Arc<dyn PageFetcher>,
        mode: ListingMode,
        preloaded: Vec<Product>,
        scroll: ScrollSubscription,
        config: ControllerConfig,
    ) -> Self {
        let pager = Pager::new(mode.clone(), preloaded, config.tolerance, config.empty_pages);
        let (tx, updates) = watch::channel(pager.snapshot());

        info!(
            mode = %mode,
            fetcher = fetcher.name(),
            preloaded = pager.products().len(),
            next_page = pager.next_page(),
            "controller started"
        );
        let task = runtime.spawn(run(pager, fetcher, scroll, tx, config.settle));

        Self {
            mode,
            task: Some(task),
            updates,
        }
    }

    pub fn mode(&self) -> &ListingMode {
        &self.mode
    }

    /// A receiver for the published snapshots.
    pub fn updates(&self) -> watch::Receiver<PagerSnapshot> {
        self.updates.clone()
    }

    /// Stop the task and wait until it is gone.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!(mode = %self.mode, "controller dropped, aborting task");
            task.abort();
        }
    }
}

/// Controller task body.  Returns when the scroll signal or every snapshot
/// receiver is gone.
async fn run(
    mut pager: Pager,
    fetcher: Arc<dyn PageFetcher>,
    mut scroll: ScrollSubscription,
    tx: watch::Sender<PagerSnapshot>,
    settle: Duration,
) {
    loop {
        match pager.phase() {
            Phase::Idle => {
                let Some(viewport) = scroll.next().await else {
                    debug!(mode = %pager.mode(), "scroll signal closed");
                    return;
                };
                if pager.on_scroll(viewport).is_none() {
                    continue;
                }
            }
            Phase::Fetching { page } => {
                let result = fetcher.fetch_page(pager.mode(), page).await;
                if pager.on_fetch_complete(result) == AfterFetch::Rearmed {
                    scroll.discard_pending();
                }
            }
            Phase::Settling => {
                tokio::time::sleep(settle).await;
                pager.settle();
                scroll.discard_pending();
            }
        }

        if tx.send(pager.snapshot()).is_err() {
            debug!(mode = %pager.mode(), "no snapshot receivers left");
            return;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
