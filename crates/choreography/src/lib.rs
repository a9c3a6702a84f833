//! Time- and scroll-driven page state for the portfolio effects.
//!
//! Nothing in here draws. Each type is a small state machine that is fed
//! events (scroll offsets, intersection batches, clicks, resizes) plus the
//! current `Instant`, and reports what changed so the host can restyle its
//! elements.

pub mod debounce;
pub mod page;
pub mod reveal;
pub mod scroll;
pub mod typing;

pub use debounce::Debouncer;
pub use page::{Page, PageChange, PageSpec, SkillBar};
pub use reveal::{Intersection, RevealDelay, RevealObserver, RevealPolicy, RevealState};
pub use scroll::{
    Block, ClickTarget, IntersectionTracker, MenuState, PageLayout, ScrollChange, ScrollState,
    ScrollTracker,
};
pub use typing::Typewriter;
