//! Fixed-height list windowing for scrollable viewports.
//!
//! For attaching to a live viewport (listener registration, teardown), see the
//! `virtual-scroll-adapter` crate.
//!
//! This crate covers the two pieces of logic a virtualized list needs:
//! - the window calculator: scroll offset + viewport height + item height + overscan → the rows
//!   to render, each with its exact top offset
//! - the scroll-activity tracker: a debounced "is scrolling" flag, driven by position changes and
//!   a [`Scheduler`] timer capability
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - the scroll offset and viewport height
//! - a timer (or use [`ManualScheduler`] from its event loop)
//! - the actual painting of items at `offset_top`
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod activity;
mod config;
mod error;
mod scheduler;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use activity::{OnSettledCallback, ScrollActivity, ScrollPhase};
pub use config::{DEFAULT_OVERSCAN, DEFAULT_SCROLLING_DELAY, RawViewportConfig, ViewportConfig};
pub use error::ConfigError;
pub use scheduler::{ManualScheduler, Scheduler, TimerId};
pub use types::{Align, VirtualItem, VisibleRange};
pub use window::{Window, WindowIter, compute_window};
