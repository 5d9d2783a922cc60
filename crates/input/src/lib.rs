//! Pointer input: turns a pointer ray into per-target enter/leave events.
//!
//! # Invariants
//! - Hits are delivered nearest-surface-first.
//! - A target that stops propagation hides every target behind it.
//! - Leave events for a move are emitted before enter events.

pub mod pointer;

pub use pointer::{Hit, Pickable, PointerEvent, PointerRouter, intersect_all};
