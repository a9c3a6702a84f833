use std::time::{Duration, Instant};

use fxconfig::{RevealSettings, SkillSettings};

/// One entry of an intersection batch: how much of the element is visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection<K> {
    pub key: K,
    pub ratio: f32,
}

impl<K> Intersection<K> {
    pub fn new(key: K, ratio: f32) -> Self {
        Self { key, ratio }
    }
}

/// How long a crossing waits before the element is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealDelay {
    /// `index * step`, where `index` is the entry's position within its batch.
    Stagger(Duration),
    Fixed(Duration),
}

impl RevealDelay {
    fn for_index(self, index: usize) -> Duration {
        match self {
            RevealDelay::Stagger(step) => step.saturating_mul(index.min(u32::MAX as usize) as u32),
            RevealDelay::Fixed(delay) => delay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealPolicy {
    pub threshold: f32,
    pub delay: RevealDelay,
}

impl RevealPolicy {
    pub fn for_sections(settings: &RevealSettings) -> Self {
        Self {
            threshold: settings.threshold,
            delay: RevealDelay::Stagger(settings.stagger),
        }
    }

    pub fn for_skills(settings: &SkillSettings) -> Self {
        Self {
            threshold: settings.threshold,
            delay: RevealDelay::Fixed(settings.delay),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Pending,
    /// Crossed the threshold; becomes `Revealed` once the instant passes.
    Scheduled(Instant),
    Revealed,
}

/// Tracks a set of observed elements and moves each one from pending to
/// revealed exactly once.
#[derive(Debug, Clone)]
pub struct RevealObserver<K> {
    policy: RevealPolicy,
    entries: Vec<(K, RevealState)>,
}

impl<K: Clone + PartialEq> RevealObserver<K> {
    pub fn new(policy: RevealPolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
        }
    }

    pub fn policy(&self) -> RevealPolicy {
        self.policy
    }

    /// Starts observing `key`. Observing an element twice keeps its state.
    pub fn observe(&mut self, key: K) {
        if self.position(&key).is_none() {
            self.entries.push((key, RevealState::Pending));
        }
    }

    pub fn state(&self, key: &K) -> Option<RevealState> {
        self.position(key).map(|index| self.entries[index].1)
    }

    pub fn is_revealed(&self, key: &K) -> bool {
        matches!(self.state(key), Some(RevealState::Revealed))
    }

    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, state)| matches!(state, RevealState::Pending))
            .count()
    }

    /// Applies one batch of visibility reports. Entries at or above the
    /// threshold are scheduled and stop being observed; everything else is
    /// ignored. Returns the number of newly scheduled elements.
    pub fn on_intersections(&mut self, batch: &[Intersection<K>], now: Instant) -> usize {
        let mut scheduled = 0;
        for (index, entry) in batch.iter().enumerate() {
            if entry.ratio < self.policy.threshold {
                continue;
            }
            let Some(position) = self.position(&entry.key) else {
                continue;
            };
            let state = &mut self.entries[position].1;
            if *state != RevealState::Pending {
                continue;
            }
            *state = RevealState::Scheduled(now + self.policy.delay.for_index(index));
            scheduled += 1;
        }
        scheduled
    }

    /// Promotes every scheduled element whose delay has elapsed and returns
    /// their keys in observation order.
    pub fn tick(&mut self, now: Instant) -> Vec<K> {
        let mut revealed = Vec::new();
        for (key, state) in self.entries.iter_mut() {
            if let RevealState::Scheduled(at) = *state {
                if at <= now {
                    *state = RevealState::Revealed;
                    revealed.push(key.clone());
                }
            }
        }
        revealed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .iter()
            .filter_map(|(_, state)| match state {
                RevealState::Scheduled(at) => Some(*at),
                _ => None,
            })
            .min()
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(candidate, _)| candidate == key)
    }
}
