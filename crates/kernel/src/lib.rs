//! Frame kernel: the single global clock, the per-frame scheduler, and the
//! seeded generator used at scene construction.
//!
//! # Invariants
//! - Elapsed time is monotonic and starts at zero when the clock starts.
//! - Callbacks run once per frame, synchronously, in registration order.
//! - Nothing runs before the clock has started.
//! - The same seed always yields the same sequence of draws.

pub mod clock;
pub mod rng;
pub mod schedule;

pub use clock::{Frame, FrameClock};
pub use rng::SceneRng;
pub use schedule::Scheduler;
