//! Headless level: scene, streaming, road, scenery and one moving subject.

use glam::Vec3;
use roadstream_corridor::{BoundaryLimiter, Corridor, SubjectMover};
use roadstream_decor::{RoadGenerator, RoadWidth, ScatterGenerator};
use roadstream_input::{Action, MoveInput};
use roadstream_scene::Scene;
use roadstream_stream::{StreamError, StreamingController, TileGrid};
use serde::Serialize;

use crate::config::LevelConfig;

/// Everything one simulated level needs, wired by hand.
pub struct Level {
    scene: Scene,
    streaming: StreamingController,
    corridor: Corridor,
    road_width: RoadWidth,
    subject: SubjectMover,
}

/// End-of-run report.
#[derive(Debug, Clone, Serialize)]
pub struct SimSummary {
    pub ticks: u64,
    pub subject_position: [f32; 3],
    pub subject_inside_road: bool,
    pub distance_to_boundary: f32,
    pub segment_positions: Vec<f32>,
    pub segments_spawned: u64,
    pub segments_evicted: u64,
    pub tiles_constructed: usize,
    pub tiles_pooled: usize,
    pub tiles_active: usize,
    pub scene_nodes: usize,
    pub scene_events: usize,
}

impl Level {
    pub fn build(config: &LevelConfig) -> Result<Self, StreamError> {
        let grid = TileGrid::from_config(&config.grid);
        let corridor = Corridor::from_config(&config.corridor);

        let road = RoadGenerator::new(config.road, corridor.width());
        let road_width = road.width_handle();
        let scatter = ScatterGenerator::new(config.scatter.clone(), &grid, Some(road.strip()));

        let streaming = StreamingController::with_grid(config.stream, grid)?
            .with_decorator(Box::new(road))
            .with_decorator(Box::new(scatter));

        let subject = SubjectMover::new(
            config.mover,
            BoundaryLimiter::new(config.limiter),
            Vec3::ZERO,
        );

        Ok(Self {
            scene: Scene::new(),
            streaming,
            corridor,
            road_width,
            subject,
        })
    }

    /// One frame: move the subject, then stream around its new position.
    ///
    /// A road width change reaches the corridor and every generator, so
    /// segments laid from then on match the new corridor.
    pub fn step(&mut self, action: Action, dt: f32) {
        self.subject.apply(action, &mut self.corridor, dt);
        if let Action::SetRoadWidth(_) = action {
            self.road_width.set(self.corridor.width());
        }
        self.streaming
            .tick(self.subject.position(), &mut self.scene);
    }

    /// Run `ticks` frames of constant input and report.
    pub fn run(&mut self, ticks: u64, dt: f32, input: MoveInput) -> SimSummary {
        self.streaming.initialize(&mut self.scene);
        let mut scene_events = self.scene.drain_events().len();
        for _ in 0..ticks {
            self.step(Action::Move(input), dt);
            scene_events += self.scene.drain_events().len();
        }
        self.summary(ticks, scene_events)
    }

    fn summary(&self, ticks: u64, scene_events: usize) -> SimSummary {
        let position = self.subject.position();
        let stats = self.streaming.stats();
        let pool = self.streaming.store().map(|s| s.pool());
        SimSummary {
            ticks,
            subject_position: position.to_array(),
            subject_inside_road: self.corridor.is_inside(position),
            distance_to_boundary: self.corridor.distance_to_nearest_boundary(position),
            segment_positions: self.streaming.segment_positions(),
            segments_spawned: stats.total_spawned,
            segments_evicted: stats.total_evicted,
            tiles_constructed: pool.map_or(0, |p| p.constructed()),
            tiles_pooled: pool.map_or(0, |p| p.pooled_len()),
            tiles_active: pool.map_or(0, |p| p.active_len()),
            scene_nodes: self.scene.node_count(),
            scene_events,
        }
    }
}

#[cfg(test)]
impl Level {
    fn streaming(&self) -> &StreamingController {
        &self.streaming
    }

    fn corridor(&self) -> &Corridor {
        &self.corridor
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadstream_decor::SpawnTemplate;

    fn small_config() -> LevelConfig {
        let mut config = LevelConfig::default();
        config.grid.columns = 4;
        config.grid.rows = 4;
        config.grid.tile_depth = 5.0;
        config.scatter.templates = vec![SpawnTemplate {
            name: "Tree".into(),
            ..SpawnTemplate::default()
        }];
        config
    }

    #[test]
    fn forward_run_streams_and_stays_on_road() {
        let mut level = Level::build(&small_config()).unwrap();
        // 8 units/s forward with a hard right drift for 10 seconds.
        let summary = level.run(600, 1.0 / 60.0, MoveInput::new(1.0, 1.0));

        assert!(summary.subject_inside_road);
        assert!(summary.subject_position[2] > 30.0);
        assert_eq!(summary.segment_positions.len(), 3);
        assert!(summary.segments_spawned > 0);
        assert_eq!(summary.segments_spawned, summary.segments_evicted);
        assert_eq!(
            summary.tiles_active + summary.tiles_pooled,
            summary.tiles_constructed
        );
        let newest = *summary.segment_positions.last().unwrap();
        assert!(newest - summary.subject_position[2] >= 10.0);
    }

    #[test]
    fn mismatched_grid_fails_to_build() {
        let mut config = small_config();
        config.stream.segment_length = 12.0;
        assert!(matches!(
            Level::build(&config),
            Err(StreamError::SegmentLengthMismatch { .. })
        ));
    }

    #[test]
    fn road_width_action_reaches_corridor() {
        let mut level = Level::build(&small_config()).unwrap();
        level.step(Action::SetRoadWidth(12.0), 0.016);
        assert_eq!(level.corridor().half_width(), 6.0);
    }

    #[test]
    fn road_width_action_resizes_new_road_visuals() {
        let mut level = Level::build(&small_config()).unwrap();
        level.run(1, 0.016, MoveInput::default());
        level.step(Action::SetRoadWidth(12.0), 0.016);
        // Close enough to the newest segment to recycle one.
        level.streaming.tick(Vec3::new(0.0, 0.0, 35.0), &mut level.scene);

        let store = level.streaming().store().unwrap();
        let newest = store.newest().unwrap().road_visual().unwrap();
        let mesh = level.scene().get(newest.0).unwrap().mesh.clone().unwrap();
        assert_eq!(mesh.vertices[0].x, -6.0);
        let oldest = store.oldest().unwrap().road_visual().unwrap();
        let mesh = level.scene().get(oldest.0).unwrap().mesh.clone().unwrap();
        assert_eq!(mesh.vertices[0].x, -2.5);
    }

    #[test]
    fn every_segment_gets_a_road() {
        let mut level = Level::build(&small_config()).unwrap();
        level.run(1, 0.016, MoveInput::default());
        let store = level.streaming().store().unwrap();
        assert!(store.segments().all(|s| s.road_visual().is_some()));
        assert!(level.scene().object_count() >= store.len());
    }
}
