//! Reference scene host: an index arena standing in for the engine's scene graph.
//!
//! # Invariants
//! - Every mutation goes through a host trait method and is recorded in the event log.
//! - Destroying a container destroys every descendant still attached to it.
//! - Handles are never reused within one scene.

pub mod scene;

pub use scene::{Node, NodeKind, Scene, SceneEvent};
