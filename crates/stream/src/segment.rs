use glam::{Quat, Vec3};
use roadstream_common::{
    ContainerFactory, ContainerHandle, ObjectFactory, ObjectHandle, SceneHost, UnitFactory,
    UnitHandle, longitudinal,
};
use std::collections::VecDeque;

use crate::grid::TileGrid;
use crate::pool::TilePool;

/// Creation-order identity of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub u64);

/// One stretch of ground along the travel axis.
#[derive(Debug, Clone)]
pub struct Segment {
    id: SegmentId,
    position: f32,
    length: f32,
    container: ContainerHandle,
    units: Vec<UnitHandle>,
    decorations: Vec<ObjectHandle>,
    road_visual: Option<ObjectHandle>,
}

impl Segment {
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Longitudinal offset of the segment origin.
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// World-space origin of the segment.
    pub fn origin(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.position)
    }

    pub fn container(&self) -> ContainerHandle {
        self.container
    }

    pub fn units(&self) -> &[UnitHandle] {
        &self.units
    }

    pub fn decorations(&self) -> &[ObjectHandle] {
        &self.decorations
    }

    pub fn road_visual(&self) -> Option<ObjectHandle> {
        self.road_visual
    }

    /// Attach a decoration so it is destroyed with the segment.
    pub fn push_decoration(&mut self, object: ObjectHandle) {
        self.decorations.push(object);
    }

    /// Set the road visual. A previous visual is handed back to the caller,
    /// who becomes responsible for destroying it.
    pub fn set_road_visual(&mut self, object: ObjectHandle) -> Option<ObjectHandle> {
        self.road_visual.replace(object)
    }
}

/// Ordered window of active segments, oldest at the front.
#[derive(Debug)]
pub struct SegmentStore {
    grid: TileGrid,
    pool: TilePool,
    segments: VecDeque<Segment>,
    last_position: f32,
    next_id: u64,
}

impl SegmentStore {
    pub fn new(grid: TileGrid, pool: TilePool) -> Self {
        Self {
            grid,
            pool,
            segments: VecDeque::new(),
            last_position: 0.0,
            next_id: 0,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn pool(&self) -> &TilePool {
        &self.pool
    }

    /// Fill the tile pool with enough units for `segments` segments.
    pub fn prewarm<H: SceneHost + ?Sized>(&mut self, host: &mut H, segments: usize) {
        let count = segments * self.grid.tile_count();
        self.pool.prewarm(host, count);
    }

    /// Longitudinal position the next segment will be created at.
    pub fn last_position(&self) -> f32 {
        self.last_position
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn oldest(&self) -> Option<&Segment> {
        self.segments.front()
    }

    pub fn newest(&self) -> Option<&Segment> {
        self.segments.back()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Positions of all active segments, oldest first.
    pub fn positions(&self) -> Vec<f32> {
        self.segments.iter().map(|s| s.position).collect()
    }

    /// Create a segment at [`last_position`](Self::last_position), fill it
    /// with tiles and advance the position by `length`.
    pub fn create_segment<H: SceneHost + ?Sized>(
        &mut self,
        length: f32,
        host: &mut H,
    ) -> &mut Segment {
        let id = SegmentId(self.next_id);
        self.next_id += 1;

        let origin = Vec3::new(0.0, 0.0, self.last_position);
        let container = host.create_container(&format!("Segment_{}", id.0), origin);

        let mut units = Vec::with_capacity(self.grid.tile_count());
        for (x, z) in self.grid.cells() {
            let unit = self.pool.acquire(host);
            host.set_transform(unit, origin + self.grid.cell_offset(x, z), Quat::IDENTITY);
            host.set_parent(unit, Some(container));
            host.set_active(unit, true);
            units.push(unit);
        }

        tracing::debug!(
            id = id.0,
            position = self.last_position,
            tiles = units.len(),
            "segment created"
        );

        self.segments.push_back(Segment {
            id,
            position: self.last_position,
            length,
            container,
            units,
            decorations: Vec::new(),
            road_visual: None,
        });
        self.last_position += length;

        // Just pushed, so the back is always present.
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    /// Mutable access to the newest segment, for decorators.
    pub fn newest_mut(&mut self) -> Option<&mut Segment> {
        self.segments.back_mut()
    }

    /// Remove the oldest segment and tear it down.
    ///
    /// Tiles go back to the pool (or are destroyed when pooling is off)
    /// before the container is destroyed, so pooled tiles survive. Road
    /// visuals and decorations are always destroyed. Returns `None` when
    /// the store is empty.
    pub fn evict_oldest<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> Option<Segment> {
        let segment = self.segments.pop_front()?;

        for &unit in &segment.units {
            self.pool.release(host, unit);
        }
        if let Some(road) = segment.road_visual {
            host.destroy_object(road);
        }
        for &object in &segment.decorations {
            host.destroy_object(object);
        }
        host.destroy_container(segment.container);

        tracing::debug!(
            id = segment.id.0,
            position = segment.position,
            pooled = self.pool.pooled_len(),
            "segment evicted"
        );
        Some(segment)
    }

    /// Whether a new segment is needed ahead of `reference`: fewer than
    /// `min_active` segments, or the newest one starts less than half a
    /// segment ahead.
    pub fn should_spawn_ahead(&self, reference: Vec3, min_active: usize, segment_length: f32) -> bool {
        if self.segments.len() < min_active {
            return true;
        }
        match self.newest() {
            Some(newest) => newest.position - longitudinal(reference) < segment_length * 0.5,
            None => true,
        }
    }

    /// Whether the oldest segment lies more than `evict_distance` behind `reference`.
    pub fn should_evict_behind(&self, reference: Vec3, evict_distance: f32) -> bool {
        match self.oldest() {
            Some(oldest) => longitudinal(reference) - oldest.position > evict_distance,
            None => false,
        }
    }
}
