use std::time::{Duration, Instant};

use fxconfig::TypingSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Type,
    Delete,
}

/// Types a line of text one character at a time, holds it, deletes it and
/// starts over.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Byte offsets of every char boundary, including `text.len()`.
    boundaries: Vec<usize>,
    shown: usize,
    action: Action,
    next_at: Instant,
    type_delay: Duration,
    delete_delay: Duration,
    pause: Duration,
    restart_delay: Duration,
}

const MIN_STEP: Duration = Duration::from_millis(1);

impl Typewriter {
    pub fn new(settings: &TypingSettings, now: Instant) -> Self {
        let text = settings.text.clone();
        let boundaries = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        Self {
            text,
            boundaries,
            shown: 0,
            action: Action::Type,
            next_at: now + settings.start_delay,
            type_delay: settings.type_delay.max(MIN_STEP),
            delete_delay: settings.delete_delay.max(MIN_STEP),
            pause: settings.pause,
            restart_delay: settings.restart_delay.max(MIN_STEP),
        }
    }

    pub fn visible(&self) -> &str {
        &self.text[..self.boundaries[self.shown]]
    }

    pub fn is_complete(&self) -> bool {
        self.shown == self.char_count()
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_at
    }

    /// Runs every step that is due at `now`. Returns the visible text when
    /// it changed.
    pub fn tick(&mut self, now: Instant) -> Option<&str> {
        let mut changed = false;
        while self.next_at <= now {
            changed |= self.step();
        }
        changed.then(|| self.visible())
    }

    fn step(&mut self) -> bool {
        match self.action {
            Action::Type if self.shown < self.char_count() => {
                self.shown += 1;
                self.next_at += self.type_delay;
                true
            }
            Action::Type => {
                self.action = Action::Delete;
                self.next_at += self.pause;
                false
            }
            Action::Delete if self.shown > 0 => {
                self.shown -= 1;
                self.next_at += self.delete_delay;
                true
            }
            Action::Delete => {
                self.action = Action::Type;
                self.next_at += self.restart_delay;
                false
            }
        }
    }

    fn char_count(&self) -> usize {
        self.boundaries.len() - 1
    }
}
