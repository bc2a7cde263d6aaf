use glam::{Vec2, Vec3};
use roadstream_common::{MeshData, ObjectFactory, SceneHost, Transform, lateral};
use roadstream_stream::{DecorationGenerator, Segment};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Narrowest road the generator will lay down.
pub const MIN_ROAD_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    /// Whether segments carry a road at all.
    pub enabled: bool,
    /// Spawn a visual for the road. A road without a visual still counts for
    /// on-road queries.
    pub add_visual: bool,
    /// Full road width.
    pub width: f32,
    /// Height of the road surface above the ground tiles.
    pub height: f32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            add_visual: true,
            width: 5.0,
            height: 0.01,
        }
    }
}

/// Road width shared between the generators that need it.
///
/// Clones observe the same value, so a resize reaches every strip built
/// from the same handle.
#[derive(Debug, Clone)]
pub struct RoadWidth(Rc<Cell<f32>>);

impl RoadWidth {
    pub fn new(width: f32) -> Self {
        Self(Rc::new(Cell::new(clamp_width(width))))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    /// Clamped to [`MIN_ROAD_WIDTH`].
    pub fn set(&self, width: f32) {
        self.0.set(clamp_width(width));
    }
}

fn clamp_width(width: f32) -> f32 {
    if width.is_nan() {
        return MIN_ROAD_WIDTH;
    }
    width.max(MIN_ROAD_WIDTH)
}

/// The road's footprint: a strip centred on x = 0.
#[derive(Debug, Clone)]
pub struct RoadStrip {
    enabled: bool,
    width: RoadWidth,
}

impl RoadStrip {
    pub fn new(enabled: bool, width: f32) -> Self {
        Self::shared(enabled, RoadWidth::new(width))
    }

    pub fn shared(enabled: bool, width: RoadWidth) -> Self {
        Self { enabled, width }
    }

    pub fn width(&self) -> f32 {
        self.width.get()
    }

    /// Whether a world position lies on the road. Always `false` without a road.
    pub fn contains(&self, position: Vec3) -> bool {
        self.enabled && lateral(position).abs() <= self.width() / 2.0
    }
}

/// Local-space mesh of one road visual, centred on the segment origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadQuad {
    pub vertices: [Vec3; 4],
    pub triangles: [u32; 6],
    pub uvs: [Vec2; 4],
}

impl RoadQuad {
    pub fn new(width: f32, length: f32, height: f32) -> Self {
        let (hw, hl) = (width / 2.0, length / 2.0);
        Self {
            vertices: [
                Vec3::new(-hw, height, -hl),
                Vec3::new(-hw, height, hl),
                Vec3::new(hw, height, -hl),
                Vec3::new(hw, height, hl),
            ],
            triangles: [0, 1, 2, 2, 1, 3],
            uvs: [Vec2::ZERO, Vec2::Y, Vec2::X, Vec2::ONE],
        }
    }

    pub fn to_mesh(&self) -> MeshData {
        MeshData {
            vertices: self.vertices.to_vec(),
            indices: self.triangles.to_vec(),
            uvs: self.uvs.to_vec(),
        }
    }
}

/// Lays a flat road strip along every new segment.
///
/// The visual is a single `"Road"` object at the segment origin, parented
/// to the segment container. All geometry lives in its mesh; the object
/// transform carries no scale or height offset.
#[derive(Debug, Clone)]
pub struct RoadGenerator {
    config: RoadConfig,
    strip: RoadStrip,
}

impl RoadGenerator {
    pub fn from_config(config: RoadConfig) -> Self {
        Self::new(config, config.width)
    }

    /// `width` overrides `config.width` and should match the corridor the
    /// subject is confined to.
    pub fn new(config: RoadConfig, width: f32) -> Self {
        Self {
            config,
            strip: RoadStrip::new(config.enabled, width),
        }
    }

    /// A strip sharing this generator's width.
    pub fn strip(&self) -> RoadStrip {
        self.strip.clone()
    }

    /// Handle to the shared width; setting it resizes roads laid from now on.
    pub fn width_handle(&self) -> RoadWidth {
        self.strip.width.clone()
    }

    pub fn is_position_on_road(&self, position: Vec3) -> bool {
        self.strip.contains(position)
    }

    pub fn set_width(&mut self, width: f32) {
        self.strip.width.set(width);
    }

    pub fn quad(&self, length: f32) -> RoadQuad {
        RoadQuad::new(self.strip.width(), length, self.config.height)
    }
}

impl DecorationGenerator for RoadGenerator {
    fn on_segment_created(&mut self, segment: &mut Segment, host: &mut dyn SceneHost) {
        if !self.config.enabled || !self.config.add_visual {
            return;
        }
        let road = host.spawn_object(
            "Road",
            Transform::from_position(segment.origin()),
            Some(segment.container()),
        );
        host.set_mesh(road, self.quad(segment.length()).to_mesh());
        if let Some(previous) = segment.set_road_visual(road) {
            host.destroy_object(previous);
        }
        tracing::debug!(
            segment = segment.id().0,
            width = self.strip.width(),
            length = segment.length(),
            "road generated"
        );
    }

    fn name(&self) -> &str {
        "road"
    }
}
