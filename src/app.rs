//! Application state for the terminal host.
//!
//! [`App`] is the render surface's side of the controller: it holds the
//! latest [`PagerSnapshot`], the list selection, and the [`ScrollSignal`]
//! the active [`Controller`] listens on.

use ratatui::widgets::ListState;
use tokio::sync::watch;

use crate::catalog::{ListingMode, Product};
use crate::controller::Controller;
use crate::pager::PagerSnapshot;
use crate::scroll::ScrollSignal;
use crate::viewport::Viewport;

/// What keystrokes currently do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    /// Typing a search keyword.
    Search { query: String },
}

pub struct App {
    /// Latest state published by the controller.
    pub view: PagerSnapshot,
    controller: Option<Controller>,
    updates: Option<watch::Receiver<PagerSnapshot>>,
    /// Scroll events for the active controller.
    pub scroll: ScrollSignal,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Product rows visible in the list, recorded by the last draw.
    pub list_height: u16,
    /// Set by navigation, cleared once the viewport has been published.
    scrolled: bool,
    pub quit: bool,
    /// Host message shown in the status bar (e.g. a failed search).
    pub status: String,
    pub input: InputMode,
    pub show_detail: bool,
    search_request: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: PagerSnapshot::empty(ListingMode::All),
            controller: None,
            updates: None,
            scroll: ScrollSignal::new(),
            list_state: ListState::default(),
            list_height: 0,
            scrolled: false,
            quit: false,
            status: String::new(),
            input: InputMode::Browse,
            show_detail: false,
            search_request: None,
        }
    }

    /// Make `controller` the active one.  The previous controller, if any,
    /// is dropped, which cancels its work and its scroll subscription.
    pub fn attach(&mut self, controller: Controller) {
        let mut updates = controller.updates();
        self.view = updates.borrow_and_update().clone();
        self.updates = Some(updates);
        self.controller = Some(controller);
        self.list_state = ListState::default();
        self.show_detail = false;
        self.status.clear();
    }

    /// Take the active controller out, leaving the last snapshot on screen.
    pub fn detach(&mut self) -> Option<Controller> {
        self.updates = None;
        self.controller.take()
    }

    pub fn mode(&self) -> &ListingMode {
        self.controller
            .as_ref()
            .map_or(&self.view.mode, Controller::mode)
    }

    /// Pull the newest snapshot, if the controller published one.
    pub fn sync(&mut self) {
        let Some(updates) = self.updates.as_mut() else {
            return;
        };
        if matches!(updates.has_changed(), Ok(true)) {
            self.view = updates.borrow_and_update().clone();
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.view.products
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.list_state
            .selected()
            .and_then(|i| self.view.products.get(i))
    }

    // -- scroll signal -------------------------------------------------------

    /// Current list geometry, measured in product rows.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            u32::try_from(self.products().len()).unwrap_or(u32::MAX),
            u32::try_from(self.list_state.offset()).unwrap_or(u32::MAX),
            u32::from(self.list_height),
        )
    }

    /// Notify the controller if the list scrolled since the last call.
    ///
    /// Call after drawing, so the list offset reflects the new selection.
    pub fn publish_scroll(&mut self) {
        if std::mem::take(&mut self.scrolled) {
            self.scroll.notify(self.viewport());
        }
    }

    // -- navigation ----------------------------------------------------------

    fn select(&mut self, index: usize) {
        self.list_state.select(Some(index));
        self.scrolled = true;
    }

    fn move_by(&mut self, delta: isize) {
        let len = self.products().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_add_signed(delta).min(len - 1),
            None => 0,
        };
        self.select(i);
    }

    pub fn select_next(&mut self) {
        self.move_by(1);
    }

    pub fn select_previous(&mut self) {
        self.move_by(-1);
    }

    pub fn page_down(&mut self) {
        self.move_by(self.list_height.max(1) as isize);
    }

    pub fn page_up(&mut self) {
        self.move_by(-(self.list_height.max(1) as isize));
    }

    pub fn select_first(&mut self) {
        if !self.products().is_empty() {
            self.select(0);
        }
    }

    pub fn select_last(&mut self) {
        if !self.products().is_empty() {
            self.select(self.products().len() - 1);
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail && self.selected_product().is_some();
    }

    // -- search prompt -------------------------------------------------------

    pub fn begin_search(&mut self) {
        let query = self.mode().keyword().unwrap_or_default().to_string();
        self.input = InputMode::Search { query };
    }

    pub fn search_push(&mut self, c: char) {
        if let InputMode::Search { query } = &mut self.input {
            query.push(c);
        }
    }

    pub fn search_pop(&mut self) {
        if let InputMode::Search { query } = &mut self.input {
            query.pop();
        }
    }

    pub fn cancel_search(&mut self) {
        self.input = InputMode::Browse;
    }

    /// Close the prompt and queue its query for the host.  An empty query
    /// means "back to the full feed".
    pub fn submit_search(&mut self) {
        if let InputMode::Search { query } = std::mem::replace(&mut self.input, InputMode::Browse) {
            self.search_request = Some(query);
        }
    }

    pub fn take_search_request(&mut self) -> Option<String> {
        self.search_request.take()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
