use alloc::rc::Rc;
use core::fmt;

/// The callback wrapped by a [`Debounced`].
pub type DebouncedCallback<A> = Rc<dyn Fn(A)>;

struct Pending<A> {
    due_ms: u64,
    args: A,
}

/// A trailing-edge debounce wrapper around a callback.
///
/// Time is adapter-driven: callers pass `now_ms` to [`Debounced::call`] and drive the pending
/// call with [`Debounced::tick`] from their own timer/frame loop. Each instance owns its pending
/// slot, so there is never more than one scheduled call per wrapper.
///
/// Without a delay (or with a zero delay) the wrapper is the identity: every call is forwarded
/// synchronously.
///
/// When the wrapper sits behind a `RefCell` and the callback may reach back into it, use the
/// `schedule`/`take_due`/`take_pending` family instead: they hand the arguments back so the
/// callback can run after the borrow is released.
pub struct Debounced<A> {
    delay_ms: Option<u64>,
    callback: DebouncedCallback<A>,
    pending: Option<Pending<A>>,
}

impl<A> Debounced<A> {
    pub fn new(delay_ms: Option<u64>, callback: impl Fn(A) + 'static) -> Self {
        Self::from_rc(delay_ms, Rc::new(callback))
    }

    pub fn from_rc(delay_ms: Option<u64>, callback: DebouncedCallback<A>) -> Self {
        Self {
            delay_ms: delay_ms.filter(|&d| d > 0),
            callback,
            pending: None,
        }
    }

    /// The effective delay. `None` means calls are forwarded immediately.
    pub fn delay_ms(&self) -> Option<u64> {
        self.delay_ms
    }

    pub fn callback(&self) -> &DebouncedCallback<A> {
        &self.callback
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending call (if any) becomes due.
    pub fn due_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.due_ms)
    }

    /// Invokes the wrapped callback, or schedules it `delay_ms` after `now_ms`.
    ///
    /// Scheduling replaces any previously pending call; only the latest arguments survive.
    pub fn call(&mut self, args: A, now_ms: u64) {
        if let Some(args) = self.schedule(args, now_ms) {
            (self.callback)(args);
        }
    }

    /// Same as [`Debounced::call`], but returns the arguments instead of running the callback
    /// when they are due right away (no delay configured).
    pub fn schedule(&mut self, args: A, now_ms: u64) -> Option<A> {
        let Some(delay_ms) = self.delay_ms else {
            return Some(args);
        };
        if self.pending.is_some() {
            vtrace!(now_ms, "Debounced::schedule: replacing pending call");
        }
        self.pending = Some(Pending {
            due_ms: now_ms.saturating_add(delay_ms),
            args,
        });
        None
    }

    /// Fires the pending call if it is due at `now_ms`.
    ///
    /// Returns `true` if the callback ran.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.take_due(now_ms).map(|args| (self.callback)(args)).is_some()
    }

    /// Removes and returns the pending arguments if they are due at `now_ms`.
    pub fn take_due(&mut self, now_ms: u64) -> Option<A> {
        let due = matches!(&self.pending, Some(p) if now_ms >= p.due_ms);
        if !due {
            return None;
        }
        self.take_pending()
    }

    /// Fires the pending call right away, regardless of its due time.
    pub fn flush(&mut self) -> bool {
        self.take_pending().map(|args| (self.callback)(args)).is_some()
    }

    /// Removes and returns the pending arguments, regardless of their due time.
    pub fn take_pending(&mut self) -> Option<A> {
        self.pending.take().map(|p| p.args)
    }

    /// Drops the pending call without running it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

impl<A> fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("delay_ms", &self.delay_ms)
            .field("due_ms", &self.due_ms())
            .finish_non_exhaustive()
    }
}
