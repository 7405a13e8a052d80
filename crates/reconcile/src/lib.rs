//! In-place tree reconciliation.
//!
//! Updates a live tree so it matches a target tree (or target markup) while
//! preserving node identity wherever possible. One synchronous forward pass
//! with bounded lookback through a keyed-node index; callers observe or veto
//! every mutation through the [`Hooks`] trait.

pub mod attrs;
pub mod classify;
pub mod controls;
pub mod engine;
pub mod hooks;
pub mod keyed;

pub use crate::controls::ControlKind;
pub use crate::engine::{ReconcileOptions, Target, reconcile};
pub use crate::hooks::{DefaultHooks, Hooks, Verdict};
pub use crate::keyed::KeyedIndex;
