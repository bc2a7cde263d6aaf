//! Decoration generators run on every freshly streamed segment.
//!
//! # Invariants
//! - Everything a generator spawns is recorded on the segment, so eviction
//!   tears it down.
//! - Generation is deterministic for a given seed and segment sequence.

mod road;
mod scatter;

pub use road::{MIN_ROAD_WIDTH, RoadConfig, RoadGenerator, RoadQuad, RoadStrip, RoadWidth};
pub use scatter::{ScatterConfig, ScatterGenerator, SpawnTemplate};
