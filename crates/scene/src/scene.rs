use glam::{Quat, Vec3};
use roadstream_common::{
    ContainerFactory, ContainerHandle, MeshData, ObjectFactory, ObjectHandle, Transform,
    UnitFactory, UnitHandle,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a node in the scene stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Unit,
    Container,
    Object(String),
}

/// An event record produced by every mutation of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    Created { id: u64, kind: NodeKind },
    Destroyed { id: u64 },
    ActiveChanged { id: u64, active: bool },
    Reparented { id: u64, parent: Option<u64> },
    Moved { id: u64, position: Vec3 },
    MeshAssigned { id: u64, triangles: usize },
}

/// Per-node data stored in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub transform: Transform,
    pub active: bool,
    pub parent: Option<u64>,
    pub mesh: Option<MeshData>,
}

/// The in-memory scene.
///
/// Uses BTreeMap for deterministic iteration order, so two runs that issue
/// the same host calls end up with identical node tables and event logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    nodes: BTreeMap<u64, Node>,
    next_id: u64,
    units_instantiated: u64,
    #[serde(skip)]
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes of every kind.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: u64) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> &BTreeMap<u64, Node> {
        &self.nodes
    }

    /// Live unit nodes, active or not.
    pub fn unit_count(&self) -> usize {
        self.count_where(|n| n.kind == NodeKind::Unit)
    }

    pub fn active_unit_count(&self) -> usize {
        self.count_where(|n| n.kind == NodeKind::Unit && n.active)
    }

    pub fn container_count(&self) -> usize {
        self.count_where(|n| n.kind == NodeKind::Container)
    }

    pub fn object_count(&self) -> usize {
        self.count_where(|n| matches!(n.kind, NodeKind::Object(_)))
    }

    /// Total units ever instantiated over the scene's lifetime.
    pub fn units_instantiated(&self) -> u64 {
        self.units_instantiated
    }

    /// Direct children of `id`, in id order.
    pub fn children_of(&self, id: u64) -> Vec<u64> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(child, _)| *child)
            .collect()
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    fn count_where(&self, pred: impl Fn(&Node) -> bool) -> usize {
        self.nodes.values().filter(|n| pred(n)).count()
    }

    fn insert(&mut self, kind: NodeKind, name: String, transform: Transform, active: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                kind: kind.clone(),
                name,
                transform,
                active,
                parent: None,
                mesh: None,
            },
        );
        self.event_log.push(SceneEvent::Created { id, kind });
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        if self.nodes.remove(&id).is_some() {
            self.event_log.push(SceneEvent::Destroyed { id });
            true
        } else {
            tracing::warn!(id, "destroy of unknown scene node ignored");
            false
        }
    }

    fn reparent(&mut self, id: u64, parent: Option<u64>) {
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                tracing::warn!(id, parent = p, "reparent to unknown node ignored");
                return;
            }
        }
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.parent = parent;
                self.event_log.push(SceneEvent::Reparented { id, parent });
            }
            None => tracing::warn!(id, "reparent of unknown node ignored"),
        }
    }
}

impl UnitFactory for Scene {
    fn instantiate_unit(&mut self) -> UnitHandle {
        let name = format!("GroundTile_{}", self.units_instantiated);
        self.units_instantiated += 1;
        UnitHandle(self.insert(NodeKind::Unit, name, Transform::default(), false))
    }

    fn destroy_unit(&mut self, unit: UnitHandle) {
        self.remove(unit.0);
    }

    fn set_active(&mut self, unit: UnitHandle, active: bool) {
        match self.nodes.get_mut(&unit.0) {
            Some(node) if node.active != active => {
                node.active = active;
                self.event_log.push(SceneEvent::ActiveChanged {
                    id: unit.0,
                    active,
                });
            }
            Some(_) => {}
            None => tracing::warn!(%unit, "set_active on unknown unit ignored"),
        }
    }

    fn set_transform(&mut self, unit: UnitHandle, position: Vec3, rotation: Quat) {
        match self.nodes.get_mut(&unit.0) {
            Some(node) => {
                node.transform.position = position;
                node.transform.rotation = rotation;
                self.event_log.push(SceneEvent::Moved {
                    id: unit.0,
                    position,
                });
            }
            None => tracing::warn!(%unit, "set_transform on unknown unit ignored"),
        }
    }

    fn set_parent(&mut self, unit: UnitHandle, parent: Option<ContainerHandle>) {
        self.reparent(unit.0, parent.map(|c| c.0));
    }
}

impl ContainerFactory for Scene {
    fn create_container(&mut self, name: &str, position: Vec3) -> ContainerHandle {
        ContainerHandle(self.insert(
            NodeKind::Container,
            name.to_owned(),
            Transform::from_position(position),
            true,
        ))
    }

    fn destroy_container(&mut self, container: ContainerHandle) {
        // Collect the whole subtree before removing anything so the walk
        // never sees a half-removed hierarchy.
        let mut doomed = vec![container.0];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let children = self.children_of(doomed[cursor]);
            doomed.extend(children);
            cursor += 1;
        }
        for id in doomed {
            self.remove(id);
        }
    }
}

impl ObjectFactory for Scene {
    fn spawn_object(
        &mut self,
        kind: &str,
        transform: Transform,
        parent: Option<ContainerHandle>,
    ) -> ObjectHandle {
        let id = self.insert(NodeKind::Object(kind.to_owned()), kind.to_owned(), transform, true);
        if parent.is_some() {
            self.reparent(id, parent.map(|c| c.0));
        }
        ObjectHandle(id)
    }

    fn destroy_object(&mut self, object: ObjectHandle) {
        self.remove(object.0);
    }

    fn set_mesh(&mut self, object: ObjectHandle, mesh: MeshData) {
        match self.nodes.get_mut(&object.0) {
            Some(node) => {
                let triangles = mesh.triangle_count();
                node.mesh = Some(mesh);
                self.event_log.push(SceneEvent::MeshAssigned {
                    id: object.0,
                    triangles,
                });
            }
            None => tracing::warn!(%object, "set_mesh on unknown object ignored"),
        }
    }
}
