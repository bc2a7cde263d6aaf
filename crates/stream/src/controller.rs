use glam::Vec3;
use roadstream_common::SceneHost;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::decorate::DecorationGenerator;
use crate::error::StreamError;
use crate::grid::TileGrid;
use crate::pool::TilePool;
use crate::segment::{SegmentId, SegmentStore};

/// Lower bound on the active window.
pub const MIN_ACTIVE_SEGMENTS: usize = 2;
/// Lower bound on segment length.
pub const MIN_SEGMENT_LENGTH: f32 = 0.1;
/// Allowed slack between the configured segment length and the grid extent.
const LENGTH_TOLERANCE: f32 = 1e-4;

/// Streaming configuration: window size, eviction distance and pooling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Segments kept alive at minimum; also how many are created on startup.
    pub min_active_segments: usize,
    /// How far behind the reference the oldest segment may fall before recycling.
    pub evict_distance: f32,
    /// Length of every segment along the travel axis.
    pub segment_length: f32,
    /// Recycle tiles instead of destroying them.
    pub use_pooling: bool,
    /// Segments' worth of tiles constructed up front when pooling.
    pub initial_pool_segments: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            min_active_segments: 3,
            evict_distance: 50.0,
            segment_length: 20.0,
            use_pooling: true,
            initial_pool_segments: 5,
        }
    }
}

impl StreamConfig {
    /// Raise every value to its floor.
    pub fn sanitized(self) -> Self {
        Self {
            min_active_segments: self.min_active_segments.max(MIN_ACTIVE_SEGMENTS),
            evict_distance: self.evict_distance.max(0.0),
            segment_length: self.segment_length.max(MIN_SEGMENT_LENGTH),
            ..self
        }
    }
}

/// Per-tick streaming statistics for instrumentation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StreamStats {
    pub spawned_this_tick: usize,
    pub evicted_this_tick: usize,
    pub active_segments: usize,
    pub tick_time: Duration,
    pub total_ticks: u64,
    pub total_spawned: u64,
    pub total_evicted: u64,
}

/// What a single tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub evicted: Option<SegmentId>,
    pub spawned: Option<SegmentId>,
}

impl TickOutcome {
    pub fn is_idle(&self) -> bool {
        self.evicted.is_none() && self.spawned.is_none()
    }
}

/// Drives the segment window from a moving reference position.
///
/// Each tick evaluates two predicates against the reference: spawn ahead
/// (window too small, or the newest segment is less than half a segment
/// ahead) and evict behind (the oldest segment is further back than the
/// eviction distance). If either holds, the oldest segment is evicted and
/// exactly one new segment is created, so the window size never drifts.
/// A window smaller than `min_active_segments`, after the minimum is raised,
/// is first topped up ahead without evicting anything.
pub struct StreamingController {
    config: StreamConfig,
    store: Option<SegmentStore>,
    decorators: Vec<Box<dyn DecorationGenerator>>,
    stats: StreamStats,
    initialized: bool,
}

impl StreamingController {
    /// Build a controller around an existing store.
    ///
    /// Without a store the controller is permanently disabled: this is
    /// reported once here and every tick is a no-op. A store whose grid
    /// does not span exactly `segment_length` is rejected.
    pub fn new(config: StreamConfig, store: Option<SegmentStore>) -> Result<Self, StreamError> {
        let config = config.sanitized();
        match &store {
            Some(store) => {
                let grid_extent = store.grid().depth_extent();
                if (grid_extent - config.segment_length).abs() > LENGTH_TOLERANCE {
                    return Err(StreamError::SegmentLengthMismatch {
                        configured: config.segment_length,
                        grid_extent,
                    });
                }
            }
            None => {
                tracing::error!("no segment store supplied, ground streaming is disabled");
            }
        }
        Ok(Self {
            config,
            store,
            decorators: Vec::new(),
            stats: StreamStats::default(),
            initialized: false,
        })
    }

    /// Build a controller and its store from a tile grid, pooling as configured.
    pub fn with_grid(config: StreamConfig, grid: TileGrid) -> Result<Self, StreamError> {
        let store = SegmentStore::new(grid, TilePool::new(config.use_pooling));
        Self::new(config, Some(store))
    }

    /// Register a generator run on every new segment, in registration order.
    pub fn add_decorator(&mut self, decorator: Box<dyn DecorationGenerator>) {
        tracing::debug!(decorator = decorator.name(), "decorator registered");
        self.decorators.push(decorator);
    }

    pub fn with_decorator(mut self, decorator: Box<dyn DecorationGenerator>) -> Self {
        self.add_decorator(decorator);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&SegmentStore> {
        self.store.as_ref()
    }

    /// Statistics from the last tick.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Positions of the active segments, oldest first. Empty when disabled.
    pub fn segment_positions(&self) -> Vec<f32> {
        self.store
            .as_ref()
            .map(SegmentStore::positions)
            .unwrap_or_default()
    }

    /// A larger window is filled on the next tick.
    pub fn set_min_active_segments(&mut self, count: usize) {
        self.config.min_active_segments = count.max(MIN_ACTIVE_SEGMENTS);
    }

    pub fn set_evict_distance(&mut self, distance: f32) {
        self.config.evict_distance = distance.max(0.0);
    }

    /// Prewarm the pool and create the starting window. Runs once.
    pub fn initialize<H: SceneHost>(&mut self, host: &mut H) {
        if self.initialized || self.store.is_none() {
            return;
        }
        if let Some(store) = self.store.as_mut() {
            if store.pool().is_enabled() {
                store.prewarm(host, self.config.initial_pool_segments);
            }
        }
        for _ in 0..self.config.min_active_segments {
            self.spawn_segment(host);
        }
        self.initialized = true;
        tracing::info!(
            segments = self.config.min_active_segments,
            segment_length = self.config.segment_length,
            "ground streaming initialized"
        );
    }

    pub fn should_spawn_ahead(&self, reference: Vec3) -> bool {
        self.store.as_ref().is_some_and(|s| {
            s.should_spawn_ahead(
                reference,
                self.config.min_active_segments,
                self.config.segment_length,
            )
        })
    }

    pub fn should_evict_behind(&self, reference: Vec3) -> bool {
        self.store
            .as_ref()
            .is_some_and(|s| s.should_evict_behind(reference, self.config.evict_distance))
    }

    /// Advance the window for one simulation step.
    pub fn tick<H: SceneHost>(&mut self, reference: Vec3, host: &mut H) -> TickOutcome {
        if self.store.is_none() {
            return TickOutcome::default();
        }
        let _span = tracing::info_span!("stream_tick").entered();
        let tick_start = Instant::now();

        if !self.initialized {
            self.initialize(host);
        }

        let mut outcome = TickOutcome::default();
        let mut spawned = 0;
        while self.window_len() < self.config.min_active_segments {
            outcome.spawned = self.spawn_segment(host);
            spawned += 1;
        }
        if spawned > 0 {
            tracing::debug!(
                spawned,
                window = self.config.min_active_segments,
                "window topped up"
            );
        }

        if self.should_spawn_ahead(reference) || self.should_evict_behind(reference) {
            outcome.evicted = self
                .store
                .as_mut()
                .and_then(|s| s.evict_oldest(host))
                .map(|s| s.id());
            outcome.spawned = self.spawn_segment(host);
            spawned += 1;
        }

        let evicted = usize::from(outcome.evicted.is_some());
        self.stats = StreamStats {
            spawned_this_tick: spawned,
            evicted_this_tick: evicted,
            active_segments: self.window_len(),
            tick_time: tick_start.elapsed(),
            total_ticks: self.stats.total_ticks + 1,
            total_spawned: self.stats.total_spawned + spawned as u64,
            total_evicted: self.stats.total_evicted + evicted as u64,
        };

        tracing::trace!(
            spawned,
            evicted,
            active = self.stats.active_segments,
            "stream tick complete"
        );
        outcome
    }

    fn window_len(&self) -> usize {
        self.store.as_ref().map_or(0, SegmentStore::len)
    }

    fn spawn_segment<H: SceneHost>(&mut self, host: &mut H) -> Option<SegmentId> {
        let store = self.store.as_mut()?;
        let segment = store.create_segment(self.config.segment_length, host);
        for decorator in &mut self.decorators {
            decorator.on_segment_created(segment, host);
        }
        Some(segment.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use roadstream_common::{ObjectFactory, Transform};
    use roadstream_scene::Scene;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    fn small_grid() -> TileGrid {
        // 2 x 4 tiles of 5 deep spans 20 along the travel axis.
        TileGrid::new(1.0, 5.0, 2, 4)
    }

    fn controller(config: StreamConfig) -> StreamingController {
        StreamingController::with_grid(config, small_grid()).unwrap()
    }

    fn at(z: f32) -> Vec3 {
        Vec3::new(0.0, 0.0, z)
    }

    struct Recorder {
        seen: Rc<RefCell<Vec<(SegmentId, usize)>>>,
    }

    impl DecorationGenerator for Recorder {
        fn on_segment_created(&mut self, segment: &mut Segment, host: &mut dyn SceneHost) {
            let marker = host.spawn_object(
                "Marker",
                Transform::from_position(segment.origin()),
                Some(segment.container()),
            );
            segment.push_decoration(marker);
            self.seen
                .borrow_mut()
                .push((segment.id(), segment.units().len()));
        }
    }

    #[test]
    fn stream_config_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.min_active_segments, 3);
        assert_eq!(config.evict_distance, 50.0);
        assert_eq!(config.segment_length, 20.0);
        assert!(config.use_pooling);
        assert_eq!(config.initial_pool_segments, 5);
    }

    #[test]
    fn sanitized_raises_floors() {
        let config = StreamConfig {
            min_active_segments: 0,
            evict_distance: -5.0,
            segment_length: 0.0,
            ..StreamConfig::default()
        }
        .sanitized();
        assert_eq!(config.min_active_segments, MIN_ACTIVE_SEGMENTS);
        assert_eq!(config.evict_distance, 0.0);
        assert_eq!(config.segment_length, MIN_SEGMENT_LENGTH);
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let config = StreamConfig {
            segment_length: 10.0,
            ..StreamConfig::default()
        };
        let err = StreamingController::with_grid(config, small_grid())
            .err()
            .unwrap();
        assert_eq!(
            err,
            StreamError::SegmentLengthMismatch {
                configured: 10.0,
                grid_extent: 20.0
            }
        );
    }

    #[test]
    fn missing_store_disables_streaming() {
        let mut scene = Scene::new();
        let mut c = StreamingController::new(StreamConfig::default(), None).unwrap();
        assert!(!c.is_enabled());
        c.initialize(&mut scene);
        assert!(c.tick(at(100.0), &mut scene).is_idle());
        assert!(c.segment_positions().is_empty());
        assert_eq!(scene.node_count(), 0);
        assert_eq!(c.stats().total_ticks, 0);
    }

    #[test]
    fn initialize_populates_window() {
        let mut scene = Scene::new();
        let mut c = controller(StreamConfig::default());
        c.initialize(&mut scene);
        assert!(c.is_initialized());
        assert_eq!(c.segment_positions(), vec![0.0, 20.0, 40.0]);

        // Five segments' worth prewarmed, three segments' worth in use.
        let pool = c.store().unwrap().pool();
        assert_eq!(pool.constructed(), 5 * 8);
        assert_eq!(pool.active_len(), 3 * 8);
        assert_eq!(pool.pooled_len(), 2 * 8);

        c.initialize(&mut scene);
        assert_eq!(c.segment_positions().len(), 3);
    }

    #[test]
    fn first_tick_initializes_before_predicates() {
        let mut scene = Scene::new();
        let mut c = controller(StreamConfig::default());
        let outcome = c.tick(at(5.0), &mut scene);
        assert!(outcome.is_idle());
        assert_eq!(c.segment_positions(), vec![0.0, 20.0, 40.0]);
    }

    #[test]
    fn tick_recycles_oldest_when_reference_nears_newest() {
        let mut scene = Scene::new();
        let mut c = controller(StreamConfig::default());
        c.initialize(&mut scene);

        assert!(!c.should_spawn_ahead(at(5.0)));
        assert!(c.should_spawn_ahead(at(32.0)));

        let outcome = c.tick(at(32.0), &mut scene);
        assert_eq!(outcome.evicted, Some(SegmentId(0)));
        assert_eq!(outcome.spawned, Some(SegmentId(3)));
        assert_eq!(c.segment_positions(), vec![20.0, 40.0, 60.0]);
        assert_eq!(c.stats().spawned_this_tick, 1);
        assert_eq!(c.stats().evicted_this_tick, 1);
        assert_eq!(c.stats().active_segments, 3);
    }

    #[test]
    fn at_most_one_pair_per_tick() {
        let mut scene = Scene::new();
        let mut c = controller(StreamConfig::default());
        c.initialize(&mut scene);

        // Far ahead: every predicate holds, but only one pair per tick.
        c.tick(at(1000.0), &mut scene);
        assert_eq!(c.segment_positions(), vec![20.0, 40.0, 60.0]);
        c.tick(at(1000.0), &mut scene);
        assert_eq!(c.segment_positions(), vec![40.0, 60.0, 80.0]);
        assert_eq!(c.stats().total_spawned, 2);
        assert_eq!(c.stats().total_evicted, 2);
    }

    #[test]
    fn evict_behind_alone_triggers_recycle() {
        let mut scene = Scene::new();
        let config = StreamConfig {
            min_active_segments: 6,
            evict_distance: 10.0,
            ..StreamConfig::default()
        };
        let mut c = controller(config);
        c.initialize(&mut scene);
        let reference = at(15.0);
        assert!(!c.should_spawn_ahead(reference));
        assert!(c.should_evict_behind(reference));
        let outcome = c.tick(reference, &mut scene);
        assert_eq!(outcome.evicted, Some(SegmentId(0)));
        assert_eq!(c.segment_positions().len(), 6);
    }

    #[test]
    fn steady_motion_keeps_window_bounded_and_pool_stable() {
        let mut scene = Scene::new();
        let mut c = controller(StreamConfig::default());
        for step in 0..2000 {
            c.tick(at(step as f32 * 0.5), &mut scene);
            assert_eq!(c.segment_positions().len(), 3);
        }
        let pool = c.store().unwrap().pool();
        assert_eq!(pool.constructed(), 5 * 8);
        assert_eq!(pool.active_len() + pool.pooled_len(), pool.constructed());
        assert_eq!(scene.container_count(), 3);
        let newest = *c.segment_positions().last().unwrap();
        assert!(newest - 999.5 >= 10.0);
    }

    #[test]
    fn decorators_run_on_every_new_segment() {
        let mut scene = Scene::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut c = controller(StreamConfig::default()).with_decorator(Box::new(Recorder {
            seen: Rc::clone(&seen),
        }));
        c.initialize(&mut scene);
        c.tick(at(35.0), &mut scene);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|(_, tiles)| *tiles == 8));
        // The evicted segment's marker went with it.
        assert_eq!(scene.object_count(), 3);
    }

    #[test]
    fn raising_window_size_tops_up_without_evicting() {
        let mut scene = Scene::new();
        let mut c = controller(StreamConfig::default());
        c.initialize(&mut scene);
        c.set_min_active_segments(4);

        let outcome = c.tick(at(0.0), &mut scene);
        assert_eq!(outcome.spawned, Some(SegmentId(3)));
        assert_eq!(outcome.evicted, None);
        assert_eq!(c.stats().spawned_this_tick, 1);

        // A stationary reference keeps the grown window where it is.
        for _ in 0..5 {
            assert!(c.tick(at(0.0), &mut scene).is_idle());
            assert_eq!(c.segment_positions(), vec![0.0, 20.0, 40.0, 60.0]);
        }
        assert_eq!(scene.container_count(), 4);

        c.set_min_active_segments(0);
        assert_eq!(c.config().min_active_segments, MIN_ACTIVE_SEGMENTS);
        c.tick(at(0.0), &mut scene);
        assert_eq!(c.segment_positions().len(), 4);
    }

    #[derive(Clone, Default)]
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn missing_store_is_reported_once() {
        let errors = ErrorCounter::default();
        let subscriber = tracing_subscriber::registry().with(errors.clone());
        tracing::subscriber::with_default(subscriber, || {
            let mut scene = Scene::new();
            let mut c = StreamingController::new(StreamConfig::default(), None).unwrap();
            c.initialize(&mut scene);
            for step in 0..10 {
                c.tick(at(step as f32 * 30.0), &mut scene);
            }
        });
        assert_eq!(errors.0.load(Ordering::SeqCst), 1);
    }
}
