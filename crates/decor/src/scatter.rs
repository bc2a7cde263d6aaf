use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roadstream_common::{ObjectFactory, SceneHost, Transform};
use roadstream_stream::{DecorationGenerator, Segment, TileGrid};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::road::RoadStrip;

pub const MAX_TEMPLATE_WEIGHT: u32 = 100;

/// One kind of scenery that can be scattered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTemplate {
    /// Object kind handed to the host.
    pub name: String,
    /// Relative pick weight, 1 to 100.
    pub weight: u32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub can_spawn_on_road: bool,
}

impl Default for SpawnTemplate {
    fn default() -> Self {
        Self {
            name: "Prop".into(),
            weight: 1,
            min_scale: 0.8,
            max_scale: 1.2,
            can_spawn_on_road: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    pub enabled: bool,
    pub min_objects: u32,
    pub max_objects: u32,
    /// Fraction of the rolled object count actually attempted, 0 to 1.
    pub density: f32,
    pub seed: u64,
    pub templates: Vec<SpawnTemplate>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_objects: 5,
            max_objects: 15,
            density: 0.3,
            seed: 0,
            templates: Vec::new(),
        }
    }
}

impl ScatterConfig {
    pub fn sanitized(mut self) -> Self {
        self.max_objects = self.max_objects.max(self.min_objects);
        self.density = if self.density.is_nan() {
            0.0
        } else {
            self.density.clamp(0.0, 1.0)
        };
        for t in &mut self.templates {
            t.weight = t.weight.clamp(1, MAX_TEMPLATE_WEIGHT);
            t.min_scale = t.min_scale.max(0.01);
            t.max_scale = t.max_scale.max(t.min_scale);
        }
        self
    }
}

/// Scatters weighted scenery templates across each new segment.
///
/// Per segment: roll a count in `[min_objects, max_objects]`, scale it by
/// `density` and round down, then for each attempt pick a template by
/// weight and a uniform position over the segment's tile footprint.
/// Attempts landing on the road are dropped for templates that may not sit
/// there. With no templates nothing is spawned.
#[derive(Debug)]
pub struct ScatterGenerator {
    config: ScatterConfig,
    total_weight: u32,
    half_extents: Vec3,
    road: Option<RoadStrip>,
    rng: StdRng,
}

impl ScatterGenerator {
    /// `grid` gives the footprint to scatter over; `road` enables on-road rejection.
    pub fn new(config: ScatterConfig, grid: &TileGrid, road: Option<RoadStrip>) -> Self {
        let config = config.sanitized();
        if config.enabled && config.templates.is_empty() {
            tracing::warn!("scatter enabled without templates, segments will stay bare");
        }
        let total_weight = config.templates.iter().map(|t| t.weight).sum();
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            total_weight,
            half_extents: Vec3::new(grid.width_extent() / 2.0, 0.0, grid.depth_extent() / 2.0),
            road,
            config,
        }
    }

    pub fn config(&self) -> &ScatterConfig {
        &self.config
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    fn pick_template(&mut self) -> Option<usize> {
        if self.total_weight == 0 {
            return None;
        }
        let mut roll = self.rng.random_range(0..self.total_weight);
        for (index, template) in self.config.templates.iter().enumerate() {
            if roll < template.weight {
                return Some(index);
            }
            roll -= template.weight;
        }
        None
    }

    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        }
    }

    fn roll_count(&mut self) -> u32 {
        let rolled = self
            .rng
            .random_range(self.config.min_objects..=self.config.max_objects);
        (rolled as f32 * self.config.density).floor() as u32
    }
}

impl DecorationGenerator for ScatterGenerator {
    fn on_segment_created(&mut self, segment: &mut Segment, host: &mut dyn SceneHost) {
        if !self.config.enabled || self.config.templates.is_empty() {
            return;
        }

        let attempts = self.roll_count();
        let mut spawned = 0;
        for _ in 0..attempts {
            let Some(index) = self.pick_template() else {
                break;
            };
            let offset = Vec3::new(
                self.uniform(-self.half_extents.x, self.half_extents.x),
                0.0,
                self.uniform(-self.half_extents.z, self.half_extents.z),
            );
            let position = segment.origin() + offset;

            let template = &self.config.templates[index];
            let on_road = self.road.as_ref().is_some_and(|r| r.contains(position));
            if on_road && !template.can_spawn_on_road {
                continue;
            }
            let (min_scale, max_scale) = (template.min_scale, template.max_scale);
            let name = template.name.clone();

            let yaw = self.uniform(0.0, TAU);
            let scale = self.uniform(min_scale, max_scale);
            let object = host.spawn_object(
                &name,
                Transform::from_yaw_scale(position, yaw, scale),
                Some(segment.container()),
            );
            segment.push_decoration(object);
            spawned += 1;
        }

        tracing::debug!(
            segment = segment.id().0,
            attempts,
            spawned,
            "scenery scattered"
        );
    }

    fn name(&self) -> &str {
        "scatter"
    }
}
