use std::time::Instant;

use fxconfig::FxConfig;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::reveal::{RevealObserver, RevealPolicy};
use crate::scroll::{
    Block, ClickTarget, IntersectionTracker, MenuState, PageLayout, ScrollChange, ScrollTracker,
};
use crate::typing::Typewriter;

/// A skill bar and the width it fills to once visible.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillBar {
    pub block: Block,
    pub progress: u8,
}

impl SkillBar {
    pub fn new(block: Block, progress: u8) -> Self {
        Self {
            block,
            progress: progress.min(100),
        }
    }
}

/// Everything the page needs to know about its elements at start-up.
/// Empty lists mean the matching elements are absent and the effect is skipped.
#[derive(Debug, Clone, Default)]
pub struct PageSpec {
    pub layout: PageLayout,
    pub reveal_blocks: Vec<Block>,
    pub skill_bars: Vec<SkillBar>,
    pub typed_text: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageChange {
    Revealed(String),
    SkillFilled { id: String, percent: u8 },
    TypedText(String),
    Scroll(ScrollChange),
    MenuOpen(bool),
    /// The viewport settled after a burst of resizes.
    Resized,
}

/// Scroll-driven page state: reveals, skill bars, the typing effect, navbar
/// flags, the mobile menu and the resize debounce.
pub struct Page {
    reveals: RevealObserver<String>,
    reveal_tracker: IntersectionTracker,
    skills: RevealObserver<String>,
    skill_tracker: IntersectionTracker,
    skill_targets: Vec<(String, u8)>,
    typewriter: Option<Typewriter>,
    scroll: ScrollTracker,
    menu: MenuState,
    resize: Debouncer,
    viewport_height: f32,
}

impl Page {
    pub fn new(config: &FxConfig, spec: PageSpec, viewport_height: f32, now: Instant) -> Self {
        let mut reveals = RevealObserver::new(RevealPolicy::for_sections(&config.reveal));
        for block in &spec.reveal_blocks {
            reveals.observe(block.id.clone());
        }
        let reveal_tracker = IntersectionTracker::new(config.reveal.threshold, spec.reveal_blocks);

        let mut skills = RevealObserver::new(RevealPolicy::for_skills(&config.skills));
        let mut skill_targets = Vec::with_capacity(spec.skill_bars.len());
        let mut skill_blocks = Vec::with_capacity(spec.skill_bars.len());
        for bar in spec.skill_bars {
            skills.observe(bar.block.id.clone());
            skill_targets.push((bar.block.id.clone(), bar.progress));
            skill_blocks.push(bar.block);
        }
        let skill_tracker = IntersectionTracker::new(config.skills.threshold, skill_blocks);

        let typewriter = spec
            .typed_text
            .then(|| Typewriter::new(&config.typing, now));
        if typewriter.is_none() {
            debug!("typed text element absent; typing effect disabled");
        }

        let mut page = Self {
            reveals,
            reveal_tracker,
            skills,
            skill_tracker,
            skill_targets,
            typewriter,
            scroll: ScrollTracker::new(config.scroll.clone(), spec.layout),
            menu: MenuState::default(),
            resize: Debouncer::new(config.resize.debounce),
            viewport_height,
        };
        page.observe_visibility(now);
        page
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll.scroll_y()
    }

    pub fn layout(&self) -> &PageLayout {
        self.scroll.layout()
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.reveals.is_revealed(&id.to_string())
    }

    pub fn typed_text(&self) -> Option<&str> {
        self.typewriter.as_ref().map(Typewriter::visible)
    }

    pub fn menu_open(&self) -> bool {
        self.menu.is_open()
    }

    pub fn on_scroll(&mut self, scroll_y: f32, now: Instant) -> Vec<PageChange> {
        let max_scroll = (self.layout().document_height() - self.viewport_height).max(0.0);
        let clamped = scroll_y.clamp(0.0, max_scroll);
        let changes = self
            .scroll
            .update(clamped)
            .into_iter()
            .map(PageChange::Scroll)
            .collect();
        self.observe_visibility(now);
        changes
    }

    /// Scroll offset a nav link to `id` jumps to; clicking it also closes the menu.
    pub fn on_nav_click(&mut self, id: &str) -> (Option<f32>, Vec<PageChange>) {
        let target = self.layout().nav_target(id);
        let mut changes = Vec::new();
        if target.is_some() && self.menu.on_click(ClickTarget::NavLink) {
            changes.push(PageChange::MenuOpen(false));
        }
        (target, changes)
    }

    pub fn on_click(&mut self, target: ClickTarget) -> Option<PageChange> {
        self.menu
            .on_click(target)
            .then(|| PageChange::MenuOpen(self.menu.is_open()))
    }

    pub fn on_resize(&mut self, viewport_height: f32, now: Instant) {
        self.viewport_height = viewport_height;
        self.resize.trigger(now);
    }

    pub fn tick(&mut self, now: Instant) -> Vec<PageChange> {
        let mut changes: Vec<PageChange> = self
            .reveals
            .tick(now)
            .into_iter()
            .map(PageChange::Revealed)
            .collect();

        for id in self.skills.tick(now) {
            let percent = self
                .skill_targets
                .iter()
                .find(|(key, _)| *key == id)
                .map(|(_, progress)| *progress)
                .unwrap_or(0);
            changes.push(PageChange::SkillFilled { id, percent });
        }

        if let Some(text) = self.typewriter.as_mut().and_then(|writer| writer.tick(now)) {
            changes.push(PageChange::TypedText(text.to_string()));
        }

        if self.resize.poll(now) {
            debug!(height = self.viewport_height, "viewport resized");
            self.observe_visibility(now);
            changes.push(PageChange::Resized);
        }

        changes
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.reveals.next_deadline(),
            self.skills.next_deadline(),
            self.typewriter.as_ref().map(Typewriter::next_deadline),
            self.resize.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn observe_visibility(&mut self, now: Instant) {
        let scroll_y = self.scroll.scroll_y();
        let batch = self.reveal_tracker.update(scroll_y, self.viewport_height);
        if !batch.is_empty() {
            self.reveals.on_intersections(&batch, now);
        }
        let batch = self.skill_tracker.update(scroll_y, self.viewport_height);
        if !batch.is_empty() {
            self.skills.on_intersections(&batch, now);
        }
    }
}
