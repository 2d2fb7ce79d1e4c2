//! Viewport geometry and the near-bottom test.

/// Scroll metrics of the product list at the moment of a scroll event.
///
/// Units are whatever the render surface measures in; the terminal UI uses
/// list rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Total scrollable content height.
    pub content_height: u32,
    /// Distance scrolled from the top.
    pub offset: u32,
    /// Height of the visible window.
    pub visible_height: u32,
}

impl Viewport {
    pub fn new(content_height: u32, offset: u32, visible_height: u32) -> Self {
        Self {
            content_height,
            offset,
            visible_height,
        }
    }

    /// Whether the bottom of the visible window is within `tolerance` units
    /// of the end of the content.
    pub fn is_near_bottom(&self, tolerance: u32) -> bool {
        u64::from(self.offset) + u64::from(self.visible_height) + u64::from(tolerance)
            >= u64::from(self.content_height)
    }
}
