use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    Scroll,
    Resize,
}

/// An event emitted by a [`ViewportSignal`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViewportEvent {
    Scrolled { scroll_top: f64, now_ms: u64 },
    Resized { client_height: f64 },
}

impl ViewportEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Scrolled { .. } => EventKind::Scroll,
            Self::Resized { .. } => EventKind::Resize,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

pub type ViewportHandler = Box<dyn FnMut(&ViewportEvent)>;

/// The scroll container a [`crate::WindowEngine`] is bound to.
///
/// This is the only seam between the engine and the host UI: current geometry plus
/// subscribe/unsubscribe for scroll and resize events. Hosts typically implement it over a real
/// scroll element; [`ScrollViewport`] is an in-memory implementation.
pub trait ViewportSignal {
    fn client_height(&self) -> f64;
    fn scroll_top(&self) -> f64;
    fn subscribe(&self, kind: EventKind, handler: ViewportHandler) -> ListenerId;
    fn unsubscribe(&self, kind: EventKind, id: ListenerId);
}

/// Release handle for listeners registered on a viewport.
///
/// Every listener added through [`Subscription::listen`] is unsubscribed exactly once, either by
/// [`Subscription::release`] or when the handle is dropped.
#[must_use = "dropping a Subscription unsubscribes its listeners"]
pub struct Subscription {
    viewport: Rc<dyn ViewportSignal>,
    listeners: Vec<(EventKind, ListenerId)>,
}

impl Subscription {
    pub fn new(viewport: Rc<dyn ViewportSignal>) -> Self {
        Self {
            viewport,
            listeners: Vec::new(),
        }
    }

    pub fn listen(&mut self, kind: EventKind, handler: ViewportHandler) -> ListenerId {
        let id = self.viewport.subscribe(kind, handler);
        self.listeners.push((kind, id));
        id
    }

    pub fn viewport(&self) -> &Rc<dyn ViewportSignal> {
        &self.viewport
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn release(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for (kind, id) in self.listeners.drain(..) {
            self.viewport.unsubscribe(kind, id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

type SharedHandler = Rc<RefCell<ViewportHandler>>;

/// An in-memory [`ViewportSignal`].
///
/// Useful for adapters that own scroll state themselves (TUI lists, canvas renderers) and for
/// tests: the host calls [`ScrollViewport::scroll_to`] / [`ScrollViewport::resize`] and the
/// matching listeners run synchronously.
///
/// Events emitted from inside a listener (e.g. a change callback that scrolls) are queued and
/// delivered in order once the running listener returns.
pub struct ScrollViewport {
    client_height: Cell<f64>,
    scroll_top: Cell<f64>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(EventKind, ListenerId, SharedHandler)>>,
    queue: RefCell<VecDeque<ViewportEvent>>,
    dispatching: Cell<bool>,
}

impl ScrollViewport {
    pub fn new(client_height: f64) -> Self {
        Self {
            client_height: Cell::new(client_height),
            scroll_top: Cell::new(0.0),
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    /// Sets the scroll offset without emitting an event.
    pub fn set_scroll_top(&self, scroll_top: f64) {
        self.scroll_top.set(scroll_top);
    }

    /// Moves the scroll offset and emits a scroll event.
    ///
    /// The event is emitted even when the offset is unchanged, as a host re-reporting its
    /// position would.
    pub fn scroll_to(&self, scroll_top: f64, now_ms: u64) {
        self.scroll_top.set(scroll_top);
        self.dispatch(ViewportEvent::Scrolled { scroll_top, now_ms });
    }

    /// Changes the content height and emits a resize event if it differs.
    pub fn resize(&self, client_height: f64) {
        if self.client_height.get() == client_height {
            return;
        }
        self.client_height.set(client_height);
        self.dispatch(ViewportEvent::Resized { client_height });
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .count()
    }

    fn dispatch(&self, event: ViewportEvent) {
        self.queue.borrow_mut().push_back(event);
        if self.dispatching.replace(true) {
            vtrace!(kind = ?event.kind(), "ScrollViewport: queued nested event");
            return;
        }
        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            self.deliver(&event);
        }
        self.dispatching.set(false);
    }

    fn deliver(&self, event: &ViewportEvent) {
        let kind = event.kind();
        // Snapshot first so handlers may (un)subscribe while running.
        let handlers: Vec<SharedHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            let mut handler = handler.borrow_mut();
            let handler: &mut ViewportHandler = &mut handler;
            handler(event);
        }
    }
}

impl ViewportSignal for ScrollViewport {
    fn client_height(&self) -> f64 {
        self.client_height.get()
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top.get()
    }

    fn subscribe(&self, kind: EventKind, handler: ViewportHandler) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0.wrapping_add(1));
        self.listeners
            .borrow_mut()
            .push((kind, id, Rc::new(RefCell::new(handler))));
        id
    }

    fn unsubscribe(&self, kind: EventKind, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(k, i, _)| !(*k == kind && *i == id));
    }
}

impl fmt::Debug for ScrollViewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollViewport")
            .field("client_height", &self.client_height.get())
            .field("scroll_top", &self.scroll_top.get())
            .field("listeners", &self.listeners.borrow().len())
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}
