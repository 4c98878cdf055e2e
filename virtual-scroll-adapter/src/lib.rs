//! Viewport attachment for the `virtual-scroll` crate.
//!
//! The `virtual-scroll` crate is UI-agnostic and covers the window math and the debounced
//! scroll-activity state. This crate wires both to a live scrollable element:
//!
//! - [`Viewport`]: the capability a host exposes (offset, height, scroll listeners)
//! - [`ScrollBinding`]: attach/detach with guaranteed teardown of the listener and timer
//! - [`ManualViewport`]: an in-memory viewport for hosts that own their scroll state
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod binding;
mod viewport;


pub use binding::{OnChangeCallback, ScrollBinding, ScrollFrame};
pub use viewport::{ListenerId, ManualViewport, Viewport};
