//! A headless windowing calculator for vertically scrolled lists of fixed-height rows.
//!
//! Given a row count, a row height, and an overscan margin, the engine tracks a viewport's
//! scroll offset and derives:
//! - the consecutive row indexes to render
//! - the spacer heights above and below them, so the scrollable height stays correct
//! - a notification whenever the rendered index range changes (optionally debounced)
//!
//! It is UI-agnostic. A host layer is expected to provide a [`ViewportSignal`]:
//! - the viewport height
//! - the scroll offset
//! - scroll and resize events
//!
//! Debounced notifications are adapter-driven: pass `now_ms` with events and call
//! [`WindowEngine::tick`] from your timer or frame loop.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod debounce;
mod engine;
mod options;
mod range;
mod types;
mod viewport;


pub use debounce::{Debounced, DebouncedCallback};
pub use engine::{WindowEngine, compute_window, render_count};
pub use options::{DEFAULT_OVERSCAN, OnChangeRange, WindowConfig, WindowOptions};
pub use range::range;
pub use types::{RangeChange, WindowState};
pub use viewport::{
    EventKind, ListenerId, ScrollViewport, Subscription, ViewportEvent, ViewportHandler,
    ViewportSignal,
};
