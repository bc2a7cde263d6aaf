//! Shared types for the roadstream workspace.
//!
//! Handles are plain indices into whatever arena the host keeps. The core
//! never looks objects up by name or tag; every collaborator is passed in
//! explicitly through the traits in [`host`].

pub mod handle;
pub mod host;
pub mod types;

pub use handle::{ContainerHandle, ObjectHandle, UnitHandle};
pub use host::{ContainerFactory, ObjectFactory, SceneHost, UnitFactory};
pub use types::{MeshData, Transform, lateral, longitudinal};
