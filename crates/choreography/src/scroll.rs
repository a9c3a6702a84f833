use fxconfig::ScrollSettings;

use crate::reveal::Intersection;

/// A vertical band of the document, in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub top: f32,
    pub height: f32,
}

impl Block {
    pub fn new(id: impl Into<String>, top: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.top && y < self.top + self.height
    }

    /// Fraction of the block inside the viewport `[scroll_y, scroll_y + viewport_height)`.
    pub fn visibility(&self, scroll_y: f32, viewport_height: f32) -> f32 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let visible_top = self.top.max(scroll_y);
        let visible_bottom = (self.top + self.height).min(scroll_y + viewport_height);
        ((visible_bottom - visible_top) / self.height).clamp(0.0, 1.0)
    }
}

/// Geometry of the page as the scroll logic sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub sections: Vec<Block>,
    pub hero: Option<Block>,
    pub navbar_height: f32,
}

impl PageLayout {
    pub fn section(&self, id: &str) -> Option<&Block> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Scroll position that puts `id` just below the navbar.
    pub fn nav_target(&self, id: &str) -> Option<f32> {
        self.section(id)
            .map(|section| (section.top - self.navbar_height).max(0.0))
    }

    pub fn document_height(&self) -> f32 {
        self.sections
            .iter()
            .chain(self.hero.iter())
            .map(|block| block.top + block.height)
            .fold(0.0, f32::max)
    }
}

/// Flags derived from the current scroll offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollState {
    pub navbar_scrolled: bool,
    pub back_to_top_visible: bool,
    pub title_filled: bool,
    pub active_section: Option<String>,
}

impl ScrollState {
    pub fn evaluate(settings: &ScrollSettings, layout: &PageLayout, scroll_y: f32) -> Self {
        let probe = scroll_y + settings.section_probe;
        let active_section = layout
            .sections
            .iter()
            .filter(|section| section.contains(probe))
            .last()
            .map(|section| section.id.clone());
        let title_filled = layout
            .hero
            .as_ref()
            .map(|hero| scroll_y > hero.height * settings.hollow_fill_ratio)
            .unwrap_or(false);
        Self {
            navbar_scrolled: scroll_y > settings.navbar_offset,
            back_to_top_visible: scroll_y > settings.back_to_top_offset,
            title_filled,
            active_section,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrollChange {
    NavbarScrolled(bool),
    BackToTopVisible(bool),
    TitleFilled(bool),
    ActiveSection(Option<String>),
}

/// Re-evaluates [`ScrollState`] on every scroll and reports what flipped.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    settings: ScrollSettings,
    layout: PageLayout,
    scroll_y: f32,
    state: ScrollState,
}

impl ScrollTracker {
    pub fn new(settings: ScrollSettings, layout: PageLayout) -> Self {
        let state = ScrollState::evaluate(&settings, &layout, 0.0);
        Self {
            settings,
            layout,
            scroll_y: 0.0,
            state,
        }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn update(&mut self, scroll_y: f32) -> Vec<ScrollChange> {
        self.scroll_y = scroll_y;
        let next = ScrollState::evaluate(&self.settings, &self.layout, scroll_y);
        let mut changes = Vec::new();
        if next.navbar_scrolled != self.state.navbar_scrolled {
            changes.push(ScrollChange::NavbarScrolled(next.navbar_scrolled));
        }
        if next.back_to_top_visible != self.state.back_to_top_visible {
            changes.push(ScrollChange::BackToTopVisible(next.back_to_top_visible));
        }
        if next.title_filled != self.state.title_filled {
            changes.push(ScrollChange::TitleFilled(next.title_filled));
        }
        if next.active_section != self.state.active_section {
            changes.push(ScrollChange::ActiveSection(next.active_section.clone()));
        }
        self.state = next;
        changes
    }
}

/// Reports visibility ratios for a set of blocks whenever one of them crosses
/// `threshold`, plus once for every block on the first update.
#[derive(Debug, Clone)]
pub struct IntersectionTracker {
    threshold: f32,
    blocks: Vec<(Block, Option<bool>)>,
}

impl IntersectionTracker {
    pub fn new(threshold: f32, blocks: impl IntoIterator<Item = Block>) -> Self {
        Self {
            threshold,
            blocks: blocks.into_iter().map(|block| (block, None)).collect(),
        }
    }

    pub fn update(&mut self, scroll_y: f32, viewport_height: f32) -> Vec<Intersection<String>> {
        let mut batch = Vec::new();
        for (block, last) in self.blocks.iter_mut() {
            let ratio = block.visibility(scroll_y, viewport_height);
            let above = ratio >= self.threshold;
            if *last != Some(above) {
                *last = Some(above);
                batch.push(Intersection::new(block.id.clone(), ratio));
            }
        }
        batch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Hamburger,
    Menu,
    NavLink,
    Elsewhere,
}

/// Open/closed state of the mobile navigation menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns `true` when the click changed the menu state.
    pub fn on_click(&mut self, target: ClickTarget) -> bool {
        let before = self.open;
        match target {
            ClickTarget::Hamburger => self.open = !self.open,
            ClickTarget::Menu => {}
            ClickTarget::NavLink | ClickTarget::Elsewhere => self.open = false,
        }
        before != self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PageLayout {
        PageLayout {
            hero: Some(Block::new("home", 0.0, 800.0)),
            sections: vec![
                Block::new("home", 0.0, 800.0),
                Block::new("about", 800.0, 600.0),
                Block::new("contact", 1400.0, 500.0),
            ],
            navbar_height: 70.0,
        }
    }

    #[test]
    fn evaluates_thresholds() {
        let settings = ScrollSettings::default();
        let top = ScrollState::evaluate(&settings, &layout(), 0.0);
        assert!(!top.navbar_scrolled);
        assert!(!top.title_filled);
        assert_eq!(top.active_section.as_deref(), Some("home"));

        let mid = ScrollState::evaluate(&settings, &layout(), 700.0);
        assert!(mid.navbar_scrolled);
        assert!(mid.back_to_top_visible);
        assert!(mid.title_filled);
        assert_eq!(mid.active_section.as_deref(), Some("about"));
    }

    #[test]
    fn no_active_section_past_the_document() {
        let settings = ScrollSettings::default();
        let state = ScrollState::evaluate(&settings, &layout(), 5000.0);
        assert_eq!(state.active_section, None);
    }

    #[test]
    fn tracker_reports_only_flips() {
        let mut tracker = ScrollTracker::new(ScrollSettings::default(), layout());
        assert_eq!(
            tracker.update(120.0),
            vec![ScrollChange::NavbarScrolled(true)]
        );
        assert!(tracker.update(130.0).is_empty());
        let changes = tracker.update(900.0);
        assert!(changes.contains(&ScrollChange::BackToTopVisible(true)));
        assert!(changes.contains(&ScrollChange::TitleFilled(true)));
        assert!(changes.contains(&ScrollChange::ActiveSection(Some("about".into()))));
    }

    #[test]
    fn nav_target_accounts_for_navbar() {
        assert_eq!(layout().nav_target("about"), Some(730.0));
        assert_eq!(layout().nav_target("home"), Some(0.0));
        assert_eq!(layout().nav_target("missing"), None);
    }

    #[test]
    fn visibility_ratio_is_clamped() {
        let block = Block::new("about", 800.0, 600.0);
        assert_eq!(block.visibility(0.0, 800.0), 0.0);
        assert!((block.visibility(500.0, 800.0) - 0.833_333).abs() < 1e-4);
        assert_eq!(block.visibility(800.0, 800.0), 1.0);
    }

    #[test]
    fn intersection_tracker_reports_crossings() {
        let mut tracker = IntersectionTracker::new(
            0.15,
            vec![Block::new("a", 0.0, 500.0), Block::new("b", 1000.0, 500.0)],
        );
        let initial = tracker.update(0.0, 800.0);
        assert_eq!(initial.len(), 2);
        assert!(tracker.update(10.0, 800.0).is_empty());
        let crossed = tracker.update(400.0, 800.0);
        assert_eq!(crossed.len(), 1);
        assert_eq!(crossed[0].key, "b");
        assert!(crossed[0].ratio >= 0.15);
    }

    #[test]
    fn menu_closes_on_outside_clicks() {
        let mut menu = MenuState::default();
        assert!(menu.on_click(ClickTarget::Hamburger));
        assert!(menu.is_open());
        assert!(!menu.on_click(ClickTarget::Menu));
        assert!(menu.is_open());
        assert!(menu.on_click(ClickTarget::Elsewhere));
        assert!(!menu.is_open());
        menu.on_click(ClickTarget::Hamburger);
        assert!(menu.on_click(ClickTarget::NavLink));
    }
}
