use alloc::rc::Rc;

/// Overscan used when none is configured.
pub const DEFAULT_OVERSCAN: usize = 4;

/// A callback fired when the rendered index range changes.
///
/// Arguments are `(visible_indices, index_from, index_to)`; `index_to` is exclusive.
pub type OnChangeRange = Rc<dyn Fn(&[usize], usize, usize)>;

/// The plain-data part of [`WindowOptions`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowConfig {
    pub row_count: usize,
    pub row_height: f64,
    pub overscan: usize,
    pub debounce_ms: Option<u64>,
}

impl WindowConfig {
    pub fn new(row_count: usize, row_height: f64) -> Self {
        Self {
            row_count,
            row_height,
            overscan: DEFAULT_OVERSCAN,
            debounce_ms: None,
        }
    }

    /// Whether `row_height` can be used to divide pixel offsets into rows.
    pub fn has_valid_row_height(&self) -> bool {
        self.row_height.is_finite() && self.row_height > 0.0
    }

    /// Total scrollable height of all rows.
    pub fn full_height(&self) -> f64 {
        self.row_count as f64 * self.row_height
    }
}

/// Configuration for [`crate::WindowEngine`].
///
/// Cheap to clone: the notification callback is stored in an `Rc`, and its identity
/// (`Rc::ptr_eq`) is what the engine compares when deciding whether to re-attach. The engine is
/// single-threaded, so the callback may capture `Rc`/`RefCell` UI state directly.
pub struct WindowOptions {
    pub row_count: usize,
    pub row_height: f64,
    pub overscan: usize,
    /// Trailing debounce for `on_change_range`. `None` (or zero) notifies synchronously.
    pub debounce_ms: Option<u64>,
    pub on_change_range: Option<OnChangeRange>,
}

impl Clone for WindowOptions {
    fn clone(&self) -> Self {
        Self {
            row_count: self.row_count,
            row_height: self.row_height,
            overscan: self.overscan,
            debounce_ms: self.debounce_ms,
            on_change_range: self.on_change_range.clone(),
        }
    }
}

impl WindowOptions {
    pub fn new(row_count: usize, row_height: f64) -> Self {
        Self::from_config(WindowConfig::new(row_count, row_height))
    }

    pub fn from_config(config: WindowConfig) -> Self {
        Self {
            row_count: config.row_count,
            row_height: config.row_height,
            overscan: config.overscan,
            debounce_ms: config.debounce_ms,
            on_change_range: None,
        }
    }

    pub fn config(&self) -> WindowConfig {
        WindowConfig {
            row_count: self.row_count,
            row_height: self.row_height,
            overscan: self.overscan,
            debounce_ms: self.debounce_ms,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: Option<u64>) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_on_change_range(
        mut self,
        on_change_range: Option<impl Fn(&[usize], usize, usize) + 'static>,
    ) -> Self {
        self.on_change_range = on_change_range.map(|f| Rc::new(f) as _);
        self
    }

    /// Sets an already shared callback, keeping its identity.
    pub fn with_on_change_range_rc(mut self, on_change_range: Option<OnChangeRange>) -> Self {
        self.on_change_range = on_change_range;
        self
    }
}

impl core::fmt::Debug for WindowOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("row_count", &self.row_count)
            .field("row_height", &self.row_height)
            .field("overscan", &self.overscan)
            .field("debounce_ms", &self.debounce_ms)
            .field("on_change_range", &self.on_change_range.is_some())
            .finish()
    }
}
