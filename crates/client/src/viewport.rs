//! Viewport scroll state and the derived at-bottom flag.

/// Rows of slack within which the viewport still counts as "at bottom".
///
/// A small tolerance keeps autoscroll engaged when the view is within a few
/// rows of the newest content.
pub const BOTTOM_SLACK: u16 = 3;

/// Scroll position tracker for the chat history view.
///
/// The at-bottom flag is recomputed on every scroll event and every extent
/// change, not just at send time, since the user may scroll away mid-stream.
/// While the flag is set, content growth keeps the view pinned to the newest
/// content; once the user scrolls up, updates leave the position alone.
#[derive(Debug, Clone)]
pub struct Viewport {
    scroll: u16,
    content_height: u16,
    visible_height: u16,
    at_bottom: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Creates an empty viewport, considered at bottom.
    pub fn new() -> Self {
        Self {
            scroll: 0,
            content_height: 0,
            visible_height: 0,
            at_bottom: true,
        }
    }

    fn max_scroll(&self) -> u16 {
        self.content_height.saturating_sub(self.visible_height)
    }

    fn distance_from_bottom(&self) -> u16 {
        self.max_scroll().saturating_sub(self.scroll)
    }

    /// Records new content/visible heights after a render or content update.
    ///
    /// If the view was at the bottom before the update, it follows the new
    /// bottom; otherwise the scroll position is left unchanged (clamped).
    pub fn update_extents(&mut self, content_height: u16, visible_height: u16) {
        let was_at_bottom = self.at_bottom;
        self.content_height = content_height;
        self.visible_height = visible_height;
        if was_at_bottom {
            self.scroll = self.max_scroll();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }
        self.at_bottom = self.distance_from_bottom() <= BOTTOM_SLACK;
    }

    /// Scrolls by `delta` rows (negative = up) and recomputes the flag.
    pub fn scroll_by(&mut self, delta: i32) {
        let current = self.scroll.min(self.max_scroll());
        self.scroll = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs() as u16)
        } else {
            current.saturating_add(delta as u16).min(self.max_scroll())
        };
        self.at_bottom = self.distance_from_bottom() <= BOTTOM_SLACK;
    }

    /// Jumps to the newest content.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
        self.at_bottom = true;
    }

    /// Returns the clamped scroll offset for rendering.
    pub fn offset(&self) -> u16 {
        self.scroll.min(self.max_scroll())
    }

    /// Whether the user is currently viewing the newest content.
    pub fn is_at_bottom(&self) -> bool {
        self.at_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_viewport_is_at_bottom() {
        let viewport = Viewport::new();
        assert!(viewport.is_at_bottom());
        assert_eq!(viewport.offset(), 0);
    }

    #[test]
    fn content_growth_follows_bottom_while_flag_is_set() {
        let mut viewport = Viewport::new();
        viewport.update_extents(50, 10);
        assert!(viewport.is_at_bottom());
        assert_eq!(viewport.offset(), 40);

        viewport.update_extents(60, 10);
        assert_eq!(viewport.offset(), 50);
        assert!(viewport.is_at_bottom());
    }

    #[test]
    fn scrolled_up_view_is_not_yanked_by_updates() {
        let mut viewport = Viewport::new();
        viewport.update_extents(50, 10);
        viewport.scroll_by(-20);
        assert!(!viewport.is_at_bottom());
        let position = viewport.offset();

        viewport.update_extents(60, 10);
        assert_eq!(viewport.offset(), position);
        assert!(!viewport.is_at_bottom());
    }

    #[test]
    fn scrolling_near_bottom_within_slack_counts_as_at_bottom() {
        let mut viewport = Viewport::new();
        viewport.update_extents(50, 10);
        viewport.scroll_by(-(BOTTOM_SLACK as i32));
        assert!(viewport.is_at_bottom());

        viewport.scroll_by(-1);
        assert!(!viewport.is_at_bottom());
    }

    #[test]
    fn scroll_back_down_reengages_autoscroll() {
        let mut viewport = Viewport::new();
        viewport.update_extents(50, 10);
        viewport.scroll_by(-30);
        assert!(!viewport.is_at_bottom());

        viewport.scroll_by(30);
        assert!(viewport.is_at_bottom());

        viewport.update_extents(80, 10);
        assert_eq!(viewport.offset(), 70);
    }

    #[test]
    fn scroll_to_bottom_clamps_and_sets_flag() {
        let mut viewport = Viewport::new();
        viewport.update_extents(50, 10);
        viewport.scroll_by(-25);
        viewport.scroll_to_bottom();
        assert_eq!(viewport.offset(), 40);
        assert!(viewport.is_at_bottom());
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut viewport = Viewport::new();
        viewport.update_extents(5, 10);
        viewport.scroll_by(3);
        assert_eq!(viewport.offset(), 0);
        assert!(viewport.is_at_bottom());
    }
}
