//! Host events and the listener registry that fans them out.
//!
//! Listeners receive `&mut S` so handlers can mutate the owning state without
//! shared mutability. Handles returned by [`EventBus::subscribe`] allow a
//! single listener to be detached; [`EventBus::clear`] detaches everything on
//! teardown.

use std::fmt;

use crate::types::{Point, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMoved(Point),
    PointerPressed,
    PointerReleased,
    /// The pointer left the window.
    PointerLeft,
    Scrolled { delta_y: f32 },
    Resized(Viewport),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::PointerMoved(_) => EventKind::PointerMoved,
            HostEvent::PointerPressed => EventKind::PointerPressed,
            HostEvent::PointerReleased => EventKind::PointerReleased,
            HostEvent::PointerLeft => EventKind::PointerLeft,
            HostEvent::Scrolled { .. } => EventKind::Scrolled,
            HostEvent::Resized(_) => EventKind::Resized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMoved,
    PointerPressed,
    PointerReleased,
    PointerLeft,
    Scrolled,
    Resized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener<S> = Box<dyn FnMut(&mut S, &HostEvent)>;

struct Entry<S> {
    id: Subscription,
    kind: EventKind,
    listener: Listener<S>,
}

pub struct EventBus<S> {
    entries: Vec<Entry<S>>,
    next_id: u64,
}

impl<S> Default for EventBus<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<S> fmt::Debug for EventBus<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.entries.len())
            .finish()
    }
}

impl<S> EventBus<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> Subscription
    where
        F: FnMut(&mut S, &HostEvent) + 'static,
    {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            listener: Box::new(listener),
        });
        id
    }

    /// Detaches a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != subscription);
        self.entries.len() != before
    }

    /// Calls every listener registered for the event's kind, in
    /// subscription order. Returns how many listeners ran.
    pub fn dispatch(&mut self, state: &mut S, event: &HostEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for entry in self.entries.iter_mut().filter(|entry| entry.kind == kind) {
            (entry.listener)(state, event);
            delivered += 1;
        }
        delivered
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
