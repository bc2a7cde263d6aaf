//! Streaming: ground segments created ahead of a moving reference and recycled behind it.
//!
//! # Invariants
//! - Segment positions strictly increase and equal the running sum of lengths.
//! - A tile unit is either pooled or owned by exactly one segment, never both.
//! - At most one evict + spawn pair happens per tick.

mod controller;
mod decorate;
mod error;
mod grid;
mod pool;
mod segment;

pub use controller::{StreamConfig, StreamStats, StreamingController, TickOutcome};
pub use decorate::DecorationGenerator;
pub use error::StreamError;
pub use grid::{GridConfig, TileGrid};
pub use pool::TilePool;
pub use segment::{Segment, SegmentId, SegmentStore};

pub fn crate_info() -> &'static str {
    concat!("roadstream-stream v", env!("CARGO_PKG_VERSION"))
}
