//! Custom-element-style lifecycle wrapper around the reconciliation engine.
//!
//! A [`Host`] owns a component instance, its host element, and an isolated
//! render root. Every observed attribute change or state replacement runs the
//! component's `render()` and reconciles the render root against the new
//! markup, then rebinds declarative `@event` handlers from scratch.

pub mod coerce;
pub mod events;
pub mod host;

pub use crate::coerce::coerce;
pub use crate::events::{Binding, Event, EventKind};
pub use crate::host::{Component, Host, ValueMap, View};
