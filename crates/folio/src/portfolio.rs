//! The portfolio page as a renderer frontend: the background scene plus the
//! scroll-driven page state, wired to host events through an event bus.

use std::time::Instant;

use choreography::{Block, ClickTarget, Page, PageChange, PageLayout, PageSpec, SkillBar};
use fxconfig::FxConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use renderer::{
    EventBus, EventKind, Frontend, HostEvent, HoverKind, Point, Rect, Rgba, Scene, Subscription,
    Surface2d, TimeSample, Viewport,
};
use tracing::{debug, info};

const NAVBAR_HEIGHT: f32 = 72.0;
const HAMBURGER_SIZE: f32 = 40.0;
const HAMBURGER_MARGIN: f32 = 16.0;
const MENU_ROW_HEIGHT: f32 = 48.0;
const MENU_PADDING: f32 = 16.0;
const CHROME_COLOR: Rgba = Rgba {
    r: 226,
    g: 232,
    b: 240,
    a: 0.9,
};

/// What a press landed on.
#[derive(Debug, Clone, PartialEq)]
enum Press {
    Target(ClickTarget),
    NavLink(String),
}

/// Hit areas of the navigation bar: the hamburger button and the dropdown
/// menu, one row per section, which only takes clicks while open.
#[derive(Debug, Clone)]
struct NavChrome {
    hamburger: Rect,
    menu: Rect,
    links: Vec<String>,
}

impl NavChrome {
    fn new(viewport: Viewport, layout: &PageLayout) -> Self {
        let hamburger = Rect::new(
            viewport.width - HAMBURGER_MARGIN - HAMBURGER_SIZE,
            ((layout.navbar_height - HAMBURGER_SIZE) / 2.0).max(0.0),
            HAMBURGER_SIZE,
            HAMBURGER_SIZE,
        );
        let links: Vec<String> = layout
            .sections
            .iter()
            .map(|section| section.id.clone())
            .collect();
        let menu = Rect::new(
            0.0,
            layout.navbar_height,
            viewport.width,
            links.len() as f32 * MENU_ROW_HEIGHT + MENU_PADDING,
        );
        Self {
            hamburger,
            menu,
            links,
        }
    }

    fn hit(&self, pointer: Point, menu_open: bool) -> Press {
        if self.hamburger.contains(pointer) {
            return Press::Target(ClickTarget::Hamburger);
        }
        if menu_open && self.menu.contains(pointer) {
            let row = ((pointer.y - self.menu.y) / MENU_ROW_HEIGHT) as usize;
            return match self.links.get(row) {
                Some(id) => Press::NavLink(id.clone()),
                None => Press::Target(ClickTarget::Menu),
            };
        }
        Press::Target(ClickTarget::Elsewhere)
    }

    fn draw(&self, surface: &mut dyn Surface2d, menu_open: bool) {
        let bar = self.hamburger.height / 6.0;
        for line in 0..3 {
            let y = self.hamburger.y + bar * (1.5 + 1.5 * line as f32);
            let width = self.hamburger.width - 2.0 * bar;
            surface.fill_rect(
                Rect::new(self.hamburger.x + bar, y, width, bar / 2.0),
                CHROME_COLOR,
            );
        }
        if !menu_open {
            return;
        }
        surface.fill_rect(self.menu, CHROME_COLOR.with_alpha(0.12));
        for row in 1..self.links.len() {
            let y = self.menu.y + row as f32 * MENU_ROW_HEIGHT;
            surface.stroke_line(
                Point::new(self.menu.x, y),
                Point::new(self.menu.x + self.menu.width, y),
                1.0,
                CHROME_COLOR.with_alpha(0.2),
            );
        }
    }
}

/// State every listener operates on.
pub struct Effects {
    config: FxConfig,
    seed: Option<u64>,
    scene: Option<Scene>,
    page: Page,
    chrome: NavChrome,
    pointer: Option<Point>,
    now: Instant,
}

impl Effects {
    fn ensure_scene(&mut self, viewport: Viewport) {
        if self.scene.is_some() {
            return;
        }
        self.scene = Scene::new(&self.config, viewport, rng(self.seed));
        if let Some(scene) = self.scene.as_mut() {
            add_hover_targets(scene, &self.config, viewport);
        }
    }

    /// Routes a press at the last pointer position to the menu or a nav
    /// link. A nav link also scrolls to its section.
    fn press(&mut self) -> Vec<PageChange> {
        let hit = match self.pointer {
            Some(pointer) => self.chrome.hit(pointer, self.page.menu_open()),
            None => Press::Target(ClickTarget::Elsewhere),
        };
        match hit {
            Press::Target(target) => self.page.on_click(target).into_iter().collect(),
            Press::NavLink(id) => {
                let (target, mut changes) = self.page.on_nav_click(&id);
                if let Some(scroll_y) = target {
                    changes.extend(self.page.on_scroll(scroll_y, self.now));
                }
                changes
            }
        }
    }

    fn report(&self, changes: Vec<PageChange>) {
        for change in changes {
            debug!(?change, "page changed");
        }
    }
}

#[cfg(test)]
impl Effects {
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn press_at(&mut self, pointer: Point) -> Vec<PageChange> {
        self.pointer = Some(pointer);
        self.press()
    }
}

pub struct Portfolio {
    bus: EventBus<Effects>,
    subscriptions: Vec<Subscription>,
    effects: Effects,
}

impl Portfolio {
    pub fn new(config: FxConfig, viewport: Viewport, seed: Option<u64>, now: Instant) -> Self {
        let page = Page::new(&config, demo_page(), viewport.height, now);
        let chrome = NavChrome::new(viewport, page.layout());
        let mut effects = Effects {
            config,
            seed,
            scene: None,
            page,
            chrome,
            pointer: None,
            now,
        };
        effects.ensure_scene(viewport);

        let mut portfolio = Self {
            bus: EventBus::new(),
            subscriptions: Vec::new(),
            effects,
        };
        portfolio.wire();
        info!("Portfolio loaded successfully");
        info!(
            particles = portfolio.effects.config.particles.count,
            "features: particle canvas, cursor ring, parallax blobs, 3D tilt with spotlight, magnetic buttons, scroll reveals, mobile menu"
        );
        portfolio
    }

    fn wire(&mut self) {
        let forward_to_scene = |effects: &mut Effects, event: &HostEvent| {
            if let Some(scene) = effects.scene.as_mut() {
                scene.handle_event(event);
            }
        };
        for kind in [
            EventKind::PointerMoved,
            EventKind::PointerPressed,
            EventKind::PointerReleased,
            EventKind::PointerLeft,
        ] {
            self.subscriptions
                .push(self.bus.subscribe(kind, forward_to_scene));
        }

        let track_pointer = |effects: &mut Effects, event: &HostEvent| match *event {
            HostEvent::PointerMoved(position) => effects.pointer = Some(position),
            HostEvent::PointerLeft => effects.pointer = None,
            _ => {}
        };
        for kind in [EventKind::PointerMoved, EventKind::PointerLeft] {
            self.subscriptions
                .push(self.bus.subscribe(kind, track_pointer));
        }

        self.subscriptions.push(self.bus.subscribe(
            EventKind::PointerPressed,
            |effects: &mut Effects, _| {
                let changes = effects.press();
                effects.report(changes);
            },
        ));

        self.subscriptions.push(self.bus.subscribe(
            EventKind::Scrolled,
            |effects: &mut Effects, event| {
                if let HostEvent::Scrolled { delta_y } = *event {
                    let target = effects.page.scroll_y() + delta_y;
                    let changes = effects.page.on_scroll(target, effects.now);
                    effects.report(changes);
                }
            },
        ));

        self.subscriptions.push(self.bus.subscribe(
            EventKind::Resized,
            |effects: &mut Effects, event| {
                if let HostEvent::Resized(viewport) = *event {
                    effects.ensure_scene(viewport);
                    effects.chrome = NavChrome::new(viewport, effects.page.layout());
                    if let Some(scene) = effects.scene.as_mut() {
                        scene.handle_event(event);
                    }
                    effects.page.on_resize(viewport.height, effects.now);
                }
            },
        ));
    }

    /// Detaches every listener; later events are ignored.
    pub fn teardown(&mut self) {
        debug!(listeners = self.subscriptions.len(), "detaching page listeners");
        self.subscriptions.clear();
        self.bus.clear();
    }
}

#[cfg(test)]
impl Portfolio {
    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut Effects {
        &mut self.effects
    }

    pub fn listener_count(&self) -> usize {
        self.bus.len()
    }
}

impl Frontend for Portfolio {
    fn handle_event(&mut self, event: HostEvent, now: Instant) {
        self.effects.now = now;
        self.bus.dispatch(&mut self.effects, &event);
    }

    fn render(&mut self, surface: &mut dyn Surface2d, sample: TimeSample) {
        self.effects.now = sample.instant;
        let changes = self.effects.page.tick(sample.instant);
        self.effects.report(changes);
        match self.effects.scene.as_mut() {
            Some(scene) => scene.frame(surface),
            None => surface.clear(),
        }
        self.effects
            .chrome
            .draw(surface, self.effects.page.menu_open());
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.effects.page.next_deadline()
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Project cards along the lower half of the viewport and two call-to-action
/// buttons above them.
fn add_hover_targets(scene: &mut Scene, config: &FxConfig, viewport: Viewport) {
    let card_width = viewport.width * 0.26;
    let card_height = viewport.height * 0.28;
    let top = viewport.height * 0.6;
    for column in 0..3 {
        let left = viewport.width * (0.06 + column as f32 * 0.32);
        scene.add_hover_target(
            Rect::new(left, top, card_width, card_height),
            HoverKind::Tilt(config.tilt.clone()),
        );
    }
    let button_top = viewport.height * 0.42;
    for column in 0..2 {
        let left = viewport.width * (0.36 + column as f32 * 0.16);
        scene.add_hover_target(
            Rect::new(left, button_top, 140.0, 44.0),
            HoverKind::Magnetic(config.magnetic.clone()),
        );
    }
}

/// The page the effects were designed for: a full-height hero followed by
/// about, skills, projects and contact sections.
pub fn demo_page() -> PageSpec {
    let hero = Block::new("home", 0.0, 900.0);
    let sections = vec![
        hero.clone(),
        Block::new("about", 900.0, 700.0),
        Block::new("skills", 1600.0, 800.0),
        Block::new("projects", 2400.0, 1000.0),
        Block::new("contact", 3400.0, 700.0),
    ];
    let reveal_blocks = vec![
        Block::new("about-text", 1000.0, 300.0),
        Block::new("about-stats", 1320.0, 200.0),
        Block::new("skills-grid", 1700.0, 600.0),
        Block::new("project-1", 2500.0, 260.0),
        Block::new("project-2", 2800.0, 260.0),
        Block::new("project-3", 3100.0, 260.0),
        Block::new("contact-form", 3500.0, 450.0),
    ];
    let skill_bars = [("rust", 90), ("typescript", 85), ("python", 80), ("sql", 75)]
        .into_iter()
        .enumerate()
        .map(|(index, (id, progress))| {
            SkillBar::new(Block::new(id, 1750.0 + index as f32 * 120.0, 24.0), progress)
        })
        .collect();
    PageSpec {
        layout: PageLayout {
            sections,
            hero: Some(hero),
            navbar_height: NAVBAR_HEIGHT,
        },
        reveal_blocks,
        skill_bars,
        typed_text: true,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use renderer::{DrawCommand, RecordingSurface, SteppedTimeSource, TimeSource};

    use super::*;

    fn portfolio(now: Instant) -> Portfolio {
        Portfolio::new(
            FxConfig::default(),
            Viewport::new(1280.0, 720.0),
            Some(11),
            now,
        )
    }

    #[test]
    fn pointer_events_reach_the_scene() {
        let now = Instant::now();
        let mut portfolio = portfolio(now);
        portfolio.handle_event(HostEvent::PointerMoved(Point::new(200.0, 100.0)), now);
        let scene = portfolio.effects().scene().unwrap();
        assert_eq!(scene.pointer().position, Some(Point::new(200.0, 100.0)));
        assert_eq!(scene.field().trail().len(), 1);
    }

    #[test]
    fn scrolling_moves_the_page_within_bounds() {
        let now = Instant::now();
        let mut portfolio = portfolio(now);
        portfolio.handle_event(HostEvent::Scrolled { delta_y: 600.0 }, now);
        assert_eq!(portfolio.effects().page().scroll_y(), 600.0);
        portfolio.handle_event(HostEvent::Scrolled { delta_y: -10_000.0 }, now);
        assert_eq!(portfolio.effects().page().scroll_y(), 0.0);
    }

    #[test]
    fn frames_advance_the_typewriter() {
        let origin = Instant::now();
        let mut portfolio = portfolio(origin);
        let mut clock = SteppedTimeSource::new(origin, Duration::from_millis(100));
        let mut surface = RecordingSurface::new(Viewport::new(1280.0, 720.0));
        for _ in 0..20 {
            let sample = clock.sample();
            portfolio.render(&mut surface, sample);
        }
        let typed = portfolio.effects().page().typed_text().unwrap();
        assert!(!typed.is_empty());
    }

    #[test]
    fn teardown_detaches_listeners() {
        let now = Instant::now();
        let mut portfolio = portfolio(now);
        assert!(portfolio.listener_count() > 0);
        portfolio.teardown();
        assert_eq!(portfolio.listener_count(), 0);

        portfolio.handle_event(HostEvent::PointerMoved(Point::new(5.0, 5.0)), now);
        let scene = portfolio.effects().scene().unwrap();
        assert_eq!(scene.pointer().position, None);
    }

    #[test]
    fn empty_viewport_defers_the_scene_until_resize() {
        let now = Instant::now();
        let mut portfolio =
            Portfolio::new(FxConfig::default(), Viewport::new(0.0, 0.0), Some(1), now);
        assert!(portfolio.effects().scene().is_none());
        let mut surface = RecordingSurface::new(Viewport::new(0.0, 0.0));
        portfolio.render(
            &mut surface,
            TimeSample {
                seconds: 0.0,
                frame_index: 0,
                instant: now,
            },
        );

        portfolio.handle_event(HostEvent::Resized(Viewport::new(640.0, 480.0)), now);
        let scene = portfolio.effects().scene().unwrap();
        assert_eq!(scene.viewport(), Viewport::new(640.0, 480.0));
        assert!(scene.hover_target(0).is_some());
    }

    const HAMBURGER: Point = Point { x: 1244.0, y: 36.0 };

    fn menu_row(index: usize) -> Point {
        Point::new(200.0, NAVBAR_HEIGHT + MENU_ROW_HEIGHT * (index as f32 + 0.5))
    }

    #[test]
    fn pressing_hamburger_opens_the_menu() {
        let now = Instant::now();
        let mut portfolio = portfolio(now);
        assert_eq!(
            portfolio.effects_mut().press_at(HAMBURGER),
            vec![PageChange::MenuOpen(true)]
        );
        assert!(portfolio.effects().page().menu_open());

        // the padding under the last link belongs to the menu and keeps it open
        let below_links = Point::new(200.0, NAVBAR_HEIGHT + 5.0 * MENU_ROW_HEIGHT + 8.0);
        assert!(portfolio.effects_mut().press_at(below_links).is_empty());
        assert!(portfolio.effects().page().menu_open());
    }

    #[test]
    fn menu_follows_pointer_presses_through_the_bus() {
        let now = Instant::now();
        let mut portfolio = portfolio(now);
        portfolio.handle_event(HostEvent::PointerMoved(HAMBURGER), now);
        portfolio.handle_event(HostEvent::PointerPressed, now);
        assert!(portfolio.effects().page().menu_open());

        let mut surface = RecordingSurface::new(Viewport::new(1280.0, 720.0));
        portfolio.render(
            &mut surface,
            TimeSample {
                seconds: 0.0,
                frame_index: 0,
                instant: now,
            },
        );
        let menu_panel = Rect::new(
            0.0,
            NAVBAR_HEIGHT,
            1280.0,
            5.0 * MENU_ROW_HEIGHT + MENU_PADDING,
        );
        assert!(surface.commands().iter().any(
            |command| matches!(command, DrawCommand::FillRect { rect, .. } if *rect == menu_panel)
        ));

        // "projects" is the fourth row
        portfolio.handle_event(HostEvent::PointerMoved(menu_row(3)), now);
        portfolio.handle_event(HostEvent::PointerPressed, now);
        let page = portfolio.effects().page();
        assert!(!page.menu_open());
        assert_eq!(page.scroll_y(), 2400.0 - NAVBAR_HEIGHT);
    }

    #[test]
    fn press_outside_closes_the_menu() {
        let now = Instant::now();
        let mut portfolio = portfolio(now);
        portfolio.effects_mut().press_at(HAMBURGER);
        assert_eq!(
            portfolio.effects_mut().press_at(Point::new(600.0, 600.0)),
            vec![PageChange::MenuOpen(false)]
        );
        // menu rows are inert while the menu is closed
        assert!(portfolio.effects_mut().press_at(menu_row(1)).is_empty());
        assert_eq!(portfolio.effects().page().scroll_y(), 0.0);
    }
}
