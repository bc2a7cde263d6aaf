//! Collaborator traits implemented by the engine-facing layer.
//!
//! The streaming core calls these synchronously from inside a tick. None of
//! them can fail: a host that cannot honour a request is expected to log and
//! carry on.

use glam::{Quat, Vec3};

use crate::handle::{ContainerHandle, ObjectHandle, UnitHandle};
use crate::types::{MeshData, Transform};

/// Construction and state changes for pooled tile units.
pub trait UnitFactory {
    fn instantiate_unit(&mut self) -> UnitHandle;
    fn destroy_unit(&mut self, unit: UnitHandle);
    fn set_active(&mut self, unit: UnitHandle, active: bool);
    /// World-space placement of a unit.
    fn set_transform(&mut self, unit: UnitHandle, position: Vec3, rotation: Quat);
    /// `None` detaches the unit from any container.
    fn set_parent(&mut self, unit: UnitHandle, parent: Option<ContainerHandle>);
}

/// Segment containers.
pub trait ContainerFactory {
    fn create_container(&mut self, name: &str, position: Vec3) -> ContainerHandle;
    /// Destroys the container and, recursively, everything still parented to it.
    fn destroy_container(&mut self, container: ContainerHandle);
}

/// Non-pooled objects: road visuals and decorations.
pub trait ObjectFactory {
    fn spawn_object(
        &mut self,
        kind: &str,
        transform: Transform,
        parent: Option<ContainerHandle>,
    ) -> ObjectHandle;
    fn destroy_object(&mut self, object: ObjectHandle);
    /// Replace the object's mesh. The mesh lives and dies with the object.
    fn set_mesh(&mut self, object: ObjectHandle, mesh: MeshData);
}

/// Everything the streaming subsystem needs from the host.
pub trait SceneHost: UnitFactory + ContainerFactory + ObjectFactory {}

impl<T: UnitFactory + ContainerFactory + ObjectFactory + ?Sized> SceneHost for T {}
