use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::debounce::Debounced;
use crate::range::range;
use crate::viewport::{EventKind, Subscription, ViewportEvent, ViewportSignal};
use crate::{OnChangeRange, RangeChange, WindowConfig, WindowOptions, WindowState};

// floor/ceil for the non-negative quantities used here, without relying on `std` float math.
// `as usize` saturates and maps NaN to 0.
fn floor_to_usize(x: f64) -> usize {
    if x.is_nan() || x <= 0.0 {
        return 0;
    }
    x as usize
}

fn ceil_to_usize(x: f64) -> usize {
    let t = floor_to_usize(x);
    if (t as f64) < x { t.saturating_add(1) } else { t }
}

/// Rows needed to cover `client_height`, plus `overscan` rows on each side.
pub fn render_count(client_height: f64, row_height: f64, overscan: usize) -> usize {
    ceil_to_usize(client_height / row_height).saturating_add(overscan.saturating_mul(2))
}

/// Computes the window for a given scroll offset.
///
/// `render_count` is the session's row budget (see [`render_count`]). Everything is clamped:
/// negative or NaN offsets behave like `0`, and indexes never leave `0..=row_count`.
pub fn compute_window(config: &WindowConfig, render_count: usize, scroll_top: f64) -> WindowState {
    let row_height = config.row_height;
    let overscan = config.overscan;

    let tolerance_height = row_height * overscan as f64;
    let top_px = (scroll_top - tolerance_height).max(0.0);
    let index = floor_to_usize(top_px / row_height);

    let top_spacer_height = (index as f64 * row_height).max(0.0);
    let bottom_spacer_height =
        (config.full_height() - top_spacer_height - render_count as f64 * row_height).max(0.0);

    let index_from = index.saturating_sub(overscan).min(config.row_count);
    let index_to = index
        .saturating_add(render_count)
        .saturating_add(overscan)
        .min(config.row_count);

    WindowState {
        start_index: index_from,
        visible_indices: range(index_from, index_to),
        top_spacer_height,
        bottom_spacer_height,
        render_count,
    }
}

type SharedNotifier = Rc<RefCell<Debounced<RangeChange>>>;

/// Per-attachment mutable state. Never carried over into another session.
struct SessionCore {
    config: WindowConfig,
    render_count: usize,
    client_height: f64,
    notified: (usize, usize),
    state: Rc<RefCell<WindowState>>,
}

impl SessionCore {
    fn recompute(&mut self, scroll_top: f64) -> Option<RangeChange> {
        let next = compute_window(&self.config, self.render_count, scroll_top);
        let index_from = next.index_from();
        let index_to = next.index_to();
        vtrace!(scroll_top, index_from, index_to, "recompute");

        let change = if self.notified != (index_from, index_to) {
            self.notified = (index_from, index_to);
            Some(RangeChange {
                indices: next.visible_indices.clone(),
                index_from,
                index_to,
            })
        } else {
            None
        };

        *self.state.borrow_mut() = next;
        change
    }
}

fn update(
    core: &RefCell<SessionCore>,
    notifier: Option<&SharedNotifier>,
    scroll_top: f64,
    now_ms: u64,
) {
    if scroll_top.is_nan() || scroll_top < 0.0 {
        vwarn!(scroll_top, "scroll offset must be a non-negative number; clamping to 0");
    }
    let change = core.borrow_mut().recompute(scroll_top);
    if let (Some(change), Some(notifier)) = (change, notifier) {
        vtrace!(
            index_from = change.index_from,
            index_to = change.index_to,
            "notify range change"
        );
        deliver(notifier, |n| n.schedule(change, now_ms));
    }
}

/// Takes ready arguments out of `notifier` and runs its callback after the borrow is released,
/// so the callback may scroll the viewport (and re-enter the notifier) synchronously.
fn deliver(
    notifier: &SharedNotifier,
    take: impl FnOnce(&mut Debounced<RangeChange>) -> Option<RangeChange>,
) -> bool {
    let (callback, change) = {
        let mut notifier = notifier.borrow_mut();
        let Some(change) = take(&mut *notifier) else {
            return false;
        };
        (Rc::clone(notifier.callback()), change)
    };
    callback(change);
    true
}

/// The inputs whose change forces a re-attach.
struct Deps {
    viewport: Option<Rc<dyn ViewportSignal>>,
    row_count: usize,
    row_height: f64,
    on_change_range: Option<OnChangeRange>,
}

impl Deps {
    fn of(options: &WindowOptions, viewport: Option<&Rc<dyn ViewportSignal>>) -> Self {
        Self {
            viewport: viewport.cloned(),
            row_count: options.row_count,
            row_height: options.row_height,
            on_change_range: options.on_change_range.clone(),
        }
    }

    fn same_as(&self, other: &Self) -> bool {
        let viewport_same = match (&self.viewport, &other.viewport) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        let callback_same = match (&self.on_change_range, &other.on_change_range) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        viewport_same
            && callback_same
            && self.row_count == other.row_count
            && self.row_height.to_bits() == other.row_height.to_bits()
    }
}

struct Session {
    core: Rc<RefCell<SessionCore>>,
    notifier: Option<SharedNotifier>,
    // Dropping this unsubscribes the session's listeners.
    _subscription: Subscription,
}

/// A windowing engine bound to a [`ViewportSignal`].
///
/// The engine is UI-agnostic: the host passes a viewport and configuration to
/// [`WindowEngine::attach`] on every render, reads [`WindowEngine::state`], and calls
/// [`WindowEngine::tick`] from its timer loop when a debounce is configured.
///
/// `attach` only re-initializes when the viewport identity, `row_count`, `row_height`, or the
/// `on_change_range` identity changed. `overscan` and `debounce_ms` are captured at
/// initialization and picked up on the next re-initialization.
pub struct WindowEngine {
    options: WindowOptions,
    state: Rc<RefCell<WindowState>>,
    deps: Option<Deps>,
    session: Option<Session>,
    // Pending notification of the most recently torn-down session.
    detached_notifier: Option<SharedNotifier>,
}

impl WindowEngine {
    pub fn new(options: WindowOptions) -> Self {
        let state = WindowState::initial(options.row_count);
        Self {
            options,
            state: Rc::new(RefCell::new(state)),
            deps: None,
            session: None,
            detached_notifier: None,
        }
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn state(&self) -> WindowState {
        self.state.borrow().clone()
    }

    /// Runs `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&WindowState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// The latest viewport height reported by a resize event (or read on attach).
    ///
    /// Resizes are tracked but do not recompute `render_count` until the next re-attach.
    pub fn tracked_client_height(&self) -> Option<f64> {
        self.session
            .as_ref()
            .map(|session| session.core.borrow().client_height)
    }

    /// Reconciles the engine with the host's current options and viewport, returning the state.
    ///
    /// Passing `None` for `viewport` means the scroll element is not available yet: nothing is
    /// subscribed until a later call provides one.
    pub fn attach(
        &mut self,
        options: WindowOptions,
        viewport: Option<Rc<dyn ViewportSignal>>,
        now_ms: u64,
    ) -> WindowState {
        let deps = Deps::of(&options, viewport.as_ref());
        self.options = options;

        let unchanged = self.deps.as_ref().is_some_and(|prev| prev.same_as(&deps));
        if !unchanged {
            vdebug!(
                row_count = deps.row_count,
                row_height = deps.row_height,
                has_viewport = deps.viewport.is_some(),
                "WindowEngine::attach: re-initializing"
            );
            self.teardown();
            self.init(viewport, now_ms);
            self.deps = Some(deps);
        }

        self.state()
    }

    /// Unsubscribes from the viewport and resets to the initial state.
    ///
    /// A debounced notification that is still pending is not cancelled; it fires on a later
    /// [`WindowEngine::tick`]. Only the latest torn-down session's notification is kept: tearing
    /// down another session with a pending notification drops the older one.
    pub fn detach(&mut self) {
        vdebug!("WindowEngine::detach");
        self.teardown();
        self.deps = None;
    }

    /// Fires debounced notifications that are due at `now_ms`.
    ///
    /// Returns the number of notifications delivered.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        if let Some(notifier) = self.session.as_ref().and_then(|s| s.notifier.clone()) {
            if deliver(&notifier, |n| n.take_due(now_ms)) {
                fired += 1;
            }
        }
        if let Some(notifier) = self.detached_notifier.take() {
            if deliver(&notifier, |n| n.take_due(now_ms)) {
                fired += 1;
            }
            if notifier.borrow().is_pending() {
                self.detached_notifier = Some(notifier);
            }
        }
        fired
    }

    /// Whether a debounced notification is waiting for [`WindowEngine::tick`].
    pub fn has_pending_notification(&self) -> bool {
        let current = self
            .session
            .as_ref()
            .and_then(|s| s.notifier.as_ref())
            .is_some_and(|n| n.borrow().is_pending());
        current || self.detached_notifier.is_some()
    }

    fn teardown(&mut self) {
        let Some(session) = self.session.take() else {
            *self.state.borrow_mut() = WindowState::initial(self.options.row_count);
            return;
        };
        if let Some(notifier) = session.notifier {
            if notifier.borrow().is_pending() {
                vdebug!("WindowEngine: keeping pending notification of detached session");
                if self.detached_notifier.replace(notifier).is_some() {
                    vdebug!("WindowEngine: dropping older detached notification");
                }
            }
        }
        // `session._subscription` drops here, releasing both listeners.
        *self.state.borrow_mut() = WindowState::initial(self.options.row_count);
    }

    fn init(&mut self, viewport: Option<Rc<dyn ViewportSignal>>, now_ms: u64) {
        let Some(viewport) = viewport else {
            return;
        };
        let config = self.options.config();
        if !config.has_valid_row_height() {
            vwarn!(
                row_height = config.row_height,
                "WindowEngine: row height must be positive and finite; staying detached"
            );
            return;
        }

        let client_height = viewport.client_height().max(0.0);
        let core = Rc::new(RefCell::new(SessionCore {
            config,
            render_count: render_count(client_height, config.row_height, config.overscan),
            client_height,
            notified: (0, 0),
            state: Rc::clone(&self.state),
        }));
        let notifier = self
            .options
            .on_change_range
            .clone()
            .map(|callback| -> SharedNotifier {
                Rc::new(RefCell::new(Debounced::new(
                    config.debounce_ms,
                    move |change: RangeChange| {
                        callback(&change.indices, change.index_from, change.index_to)
                    },
                )))
            });

        let mut subscription = Subscription::new(Rc::clone(&viewport));
        {
            let core = Rc::clone(&core);
            let notifier = notifier.clone();
            subscription.listen(
                EventKind::Scroll,
                Box::new(move |event: &ViewportEvent| {
                    if let ViewportEvent::Scrolled { scroll_top, now_ms } = *event {
                        update(&core, notifier.as_ref(), scroll_top, now_ms);
                    }
                }),
            );
        }
        {
            let core = Rc::clone(&core);
            subscription.listen(
                EventKind::Resize,
                Box::new(move |event: &ViewportEvent| {
                    if let ViewportEvent::Resized { client_height } = *event {
                        vtrace!(client_height, "viewport resized");
                        core.borrow_mut().client_height = client_height.max(0.0);
                    }
                }),
            );
        }

        vdebug!(
            client_height,
            render_count = core.borrow().render_count,
            "WindowEngine: attached"
        );
        update(&core, notifier.as_ref(), viewport.scroll_top(), now_ms);

        self.session = Some(Session {
            core,
            notifier,
            _subscription: subscription,
        });
    }
}

impl fmt::Debug for WindowEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowEngine")
            .field("options", &self.options)
            .field("state", &self.state.borrow())
            .field("attached", &self.session.is_some())
            .field("detached_notifier", &self.detached_notifier.is_some())
            .finish()
    }
}
